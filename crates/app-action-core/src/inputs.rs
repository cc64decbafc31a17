//! Parsing and validation of action inputs.

use crate::github::GitHubContext;
use crate::preview::generate_app_name;

/// Parse a boolean input the way the Actions toolkit does.
///
/// Empty means `false`, so optional flags can be left unset.
pub fn parse_bool(input: &str, value: &str) -> crate::Result<bool> {
    match value {
        "" => Ok(false),
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(crate::Error::InvalidBool {
            input: input.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// How the app to delete is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Id(String),
    Name(String),
}

impl DeleteTarget {
    /// Pick the identification strategy: an explicit id, else an explicit
    /// name, else (when `from_pr_preview` is set) the preview name generated
    /// from the workflow's repository and ref.
    pub fn resolve(
        app_id: &str,
        app_name: &str,
        from_pr_preview: bool,
        ctx: impl FnOnce() -> crate::Result<GitHubContext>,
    ) -> crate::Result<Self> {
        if !app_id.is_empty() {
            return Ok(Self::Id(app_id.to_owned()));
        }
        if !app_name.is_empty() {
            return Ok(Self::Name(app_name.to_owned()));
        }
        if from_pr_preview {
            let ctx = ctx()?;
            let (owner, repo) = ctx.repo()?;
            return Ok(Self::Name(generate_app_name(owner, repo, &ctx.ref_name)));
        }
        Err(crate::Error::Config(
            "either app_id, app_name, or from_pr_preview must be set".to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_context() -> crate::Result<GitHubContext> {
        panic!("context must not be read")
    }

    #[test]
    fn parse_bool_accepts_toolkit_spellings() {
        for v in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool("x", v).unwrap(), "{v}");
        }
        for v in ["", "0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_bool("x", v).unwrap(), "{v}");
        }
    }

    #[test]
    fn parse_bool_rejects_other_values() {
        let err = parse_bool("print_build_logs", "yes").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::InvalidBool { ref input, ref value } if input == "print_build_logs" && value == "yes"
        ));
    }

    #[test]
    fn id_wins_over_name() {
        let target = DeleteTarget::resolve("id-1", "name", true, no_context).unwrap();
        assert_eq!(target, DeleteTarget::Id("id-1".to_owned()));
    }

    #[test]
    fn name_used_without_id() {
        let target = DeleteTarget::resolve("", "my-app", true, no_context).unwrap();
        assert_eq!(target, DeleteTarget::Name("my-app".to_owned()));
    }

    #[test]
    fn preview_name_generated_from_context() {
        let target = DeleteTarget::resolve("", "", true, || {
            Ok(GitHubContext {
                repository: "foo/bar".to_owned(),
                ref_name: "3/merge".to_owned(),
                ..Default::default()
            })
        })
        .unwrap();
        assert_eq!(
            target,
            DeleteTarget::Name("foo-bar-3-merge-adb46530".to_owned())
        );
    }

    #[test]
    fn nothing_set_is_a_config_error() {
        let err = DeleteTarget::resolve("", "", false, no_context).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
