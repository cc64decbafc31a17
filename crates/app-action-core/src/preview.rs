//! Pull request previews.
//!
//! A preview is a throwaway copy of the app, named after the pull request,
//! that builds from the pull request's head branch.

use sha2::{Digest, Sha256};

use crate::github::GitHubContext;
use crate::spec::AppSpec;

/// App names are limited to 32 characters by the platform.
pub const MAX_APP_NAME_LEN: usize = 32;

const HASH_LEN: usize = 8;

/// Everything needed to retarget a spec at a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTarget {
    pub repo_owner: String,
    pub repo_name: String,
    /// e.g. `3/merge`
    pub pr_ref: String,
    pub head_branch: String,
}

impl PreviewTarget {
    pub fn from_context(ctx: &GitHubContext) -> crate::Result<Self> {
        let (owner, name) = ctx.repo()?;
        Ok(Self {
            repo_owner: owner.to_owned(),
            repo_name: name.to_owned(),
            pr_ref: ctx.pr_ref()?,
            head_branch: ctx.head_ref.clone(),
        })
    }
}

/// Generate a deterministic app name for `owner/repo` at `git_ref`.
///
/// The name is lowercased with `/` and `_` turned into `-` and `:` removed,
/// then truncated so that a `-` plus the first 8 hex digits of its SHA-256
/// still fit within [`MAX_APP_NAME_LEN`].
///
/// ```
/// use app_action_core::preview::generate_app_name;
/// assert_eq!(generate_app_name("foo", "bar", "3/merge"), "foo-bar-3-merge-adb46530");
/// ```
pub fn generate_app_name(repo_owner: &str, repo: &str, git_ref: &str) -> String {
    let base: String = format!("{repo_owner}-{repo}-{git_ref}")
        .to_lowercase()
        .chars()
        .filter(|c| *c != ':')
        .map(|c| if c == '/' || c == '_' { '-' } else { c })
        .collect();

    let hash = hex::encode(Sha256::digest(base.as_bytes()));
    let suffix = format!("-{}", &hash[..HASH_LEN]);

    let limit = MAX_APP_NAME_LEN - suffix.len();
    let mut end = base.len().min(limit);
    while !base.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{suffix}", &base[..end])
}

/// Rewrite `spec` in place so it deploys as a preview of `target`.
///
/// - the app gets a name unique to the pull request
/// - domains and alerts are dropped; they belong to production
/// - components built from the triggering repository build the head branch
///   and stop deploying on push, since previews are deployed explicitly
///
/// Components built from other repositories are left alone.
pub fn sanitize_for_preview(spec: &mut AppSpec, target: &PreviewTarget) {
    spec.name = generate_app_name(&target.repo_owner, &target.repo_name, &target.pr_ref);
    spec.domains.clear();
    spec.alerts.clear();

    let repo = format!("{}/{}", target.repo_owner, target.repo_name);
    for component in spec.components_mut() {
        let Some(github) = component.source.github_mut() else {
            continue;
        };
        if github.repo != repo {
            continue;
        }
        github.deploy_on_push = false;
        github.branch = target.head_branch.clone();
        tracing::debug!(
            component = %component.name,
            branch = %github.branch,
            "retargeted component"
        );
    }
}
