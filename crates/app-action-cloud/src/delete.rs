use app_action_core::{DeleteTarget, Reporter};

use crate::api::AppsApi;
use crate::error::ApiError;
use crate::resolver::find_app_by_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { app_id: String },
    /// The app did not exist and missing apps were tolerated.
    NotFound,
}

/// Deletes an app identified by id or name.
pub struct Deleter<A, R> {
    api: A,
    reporter: R,
}

impl<A: AppsApi, R: Reporter> Deleter<A, R> {
    pub fn new(api: A, reporter: R) -> Self {
        Self { api, reporter }
    }

    /// Delete the app behind `target`.
    ///
    /// With `ignore_not_found`, a name that resolves to no app and a 404
    /// from the delete call both succeed with [`DeleteOutcome::NotFound`].
    pub async fn delete(
        &self,
        target: &DeleteTarget,
        ignore_not_found: bool,
    ) -> Result<DeleteOutcome, DeleteError> {
        let app_id = match target {
            DeleteTarget::Id(id) => id.clone(),
            DeleteTarget::Name(name) => {
                let app = find_app_by_name(&self.api, name)
                    .await
                    .map_err(|e| DeleteError::Resolve { source: e })?;
                match app {
                    Some(app) => app.id,
                    None if ignore_not_found => {
                        self.reporter
                            .info(&format!("app {name:?} not found, ignoring"));
                        return Ok(DeleteOutcome::NotFound);
                    }
                    None => return Err(DeleteError::NotFound { name: name.clone() }),
                }
            }
        };

        match self.api.delete_app(&app_id).await {
            Ok(()) => {
                tracing::debug!(%app_id, "deleted app");
                Ok(DeleteOutcome::Deleted { app_id })
            }
            Err(e) if e.is_not_found() && ignore_not_found => {
                self.reporter
                    .info(&format!("app {app_id:?} not found, ignoring"));
                Ok(DeleteOutcome::NotFound)
            }
            Err(e) => Err(DeleteError::Delete { source: e }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("failed to find app")]
    Resolve { source: ApiError },

    #[error("app {name:?} not found")]
    NotFound { name: String },

    #[error("failed to delete app")]
    Delete { source: ApiError },
}
