use std::path::PathBuf;

use app_action_core::images::{self, ImageOverride, UnmatchedPolicy};
use app_action_core::{AppSpec, Environment, Expansion};

use crate::api::AppsApi;
use crate::error::ApiError;
use crate::resolver::find_app_by_name;

/// Where the base spec comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// The current spec of the remote app with this name.
    ExistingApp(String),
    /// A local spec file, expanded against the environment.
    File(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub expansion: Expansion,
    /// Applied after the `IMAGE_*` environment overrides.
    pub overrides: Vec<ImageOverride>,
    pub unmatched: UnmatchedPolicy,
}

/// Produce the spec to deploy: load the base spec, then pin images.
///
/// Environment overrides (`IMAGE_DIGEST_<KEY>`, `IMAGE_TAG_<KEY>`) are
/// applied first, followed by the explicit overrides in `options`.
pub async fn build_spec<A: AppsApi>(
    api: &A,
    source: &SpecSource,
    env: &impl Environment,
    options: &BuildOptions,
) -> Result<AppSpec, SpecError> {
    let mut spec = match source {
        SpecSource::ExistingApp(name) => {
            let app = find_app_by_name(api, name)
                .await
                .map_err(|e| SpecError::Resolve { source: e })?
                .ok_or_else(|| SpecError::NotFound { name: name.clone() })?;
            tracing::debug!(app_id = %app.id, %name, "using spec of existing app");
            app.spec.ok_or(SpecError::MissingSpec { app_id: app.id })?
        }
        SpecSource::File(path) => AppSpec::load(path, env, options.expansion)?,
    };

    let applied = images::apply_env_overrides(&mut spec, env);
    let explicit = images::apply_overrides(&mut spec, &options.overrides, options.unmatched)?;
    for o in applied.iter().chain(&explicit) {
        tracing::info!(component = %o.component, pin = ?o.pin, "pinned image");
    }

    Ok(spec)
}

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("app {name:?} does not exist")]
    NotFound { name: String },

    #[error("app {app_id} has no spec")]
    MissingSpec { app_id: String },

    #[error("failed to look up existing app")]
    Resolve { source: ApiError },

    #[error(transparent)]
    Core(#[from] app_action_core::Error),
}
