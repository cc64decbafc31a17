use std::path::PathBuf;

use serde_json::Value;

use crate::env::Environment;

/// The subset of the workflow run context this action needs.
#[derive(Debug, Clone, Default)]
pub struct GitHubContext {
    /// `owner/name` of the repository the workflow runs in.
    pub repository: String,
    /// Short ref name, e.g. `main` or `3/merge`.
    pub ref_name: String,
    /// Source branch of a pull request; empty outside pull request events.
    pub head_ref: String,
    /// Webhook payload that triggered the run.
    pub event: Value,
}

impl GitHubContext {
    /// Read the context from the runner's `GITHUB_*` variables.
    ///
    /// Missing variables are left empty; the event payload is only read when
    /// `GITHUB_EVENT_PATH` is set.
    pub fn from_env(env: &impl Environment) -> crate::Result<Self> {
        let event = match env.var("GITHUB_EVENT_PATH").filter(|p| !p.is_empty()) {
            Some(path) => {
                let path = PathBuf::from(path);
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    crate::Error::EventRead {
                        path: path.clone(),
                        source: e,
                    }
                })?;
                serde_json::from_str(&content)
                    .map_err(|e| crate::Error::EventParse { path, source: e })?
            }
            None => Value::Null,
        };

        Ok(Self {
            repository: env.var("GITHUB_REPOSITORY").unwrap_or_default(),
            ref_name: env.var("GITHUB_REF_NAME").unwrap_or_default(),
            head_ref: env.var("GITHUB_HEAD_REF").unwrap_or_default(),
            event,
        })
    }

    /// Split the repository into `(owner, name)`.
    pub fn repo(&self) -> crate::Result<(&str, &str)> {
        match self.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok((owner, name)),
            _ => Err(crate::Error::MalformedRepository(self.repository.clone())),
        }
    }

    /// The `<number>/merge` ref of the pull request that triggered the run.
    ///
    /// Derived from the event payload rather than `GITHUB_REF_NAME`, which
    /// isn't populated for every pull request activity type.
    pub fn pr_ref(&self) -> crate::Result<String> {
        let number = self
            .event
            .get("pull_request")
            .and_then(|pr| pr.get("number"))
            .and_then(Value::as_u64)
            .ok_or(crate::Error::MissingPullRequest)?;
        Ok(format!("{number}/merge"))
    }
}
