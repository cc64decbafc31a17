use std::time::Duration;

use app_action_core::{AppSpec, Reporter};

use crate::api::{App, AppsApi, Deployment, DeploymentPhase, LogKind, PageRequest};
use crate::error::{ApiError, LogError};
use crate::logs::{LogFetcher, fetch_logs};
use crate::poll::{Cancellation, DEFAULT_POLL_INTERVAL, ticker};
use crate::resolver::find_app_by_name;

#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Echo build logs into a collapsible group of the step log.
    pub print_build_logs: bool,
    /// Echo deploy logs into a collapsible group of the step log.
    pub print_deploy_logs: bool,
    pub poll_interval: Duration,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            print_build_logs: false,
            print_deploy_logs: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Submits a spec and follows the resulting deployment until the app is live.
pub struct Deployer<A, F, R> {
    api: A,
    fetcher: F,
    reporter: R,
    options: DeployOptions,
    cancel: Cancellation,
}

impl<A, F, R> Deployer<A, F, R>
where
    A: AppsApi,
    F: LogFetcher,
    R: Reporter,
{
    pub fn new(api: A, fetcher: F, reporter: R, options: DeployOptions) -> Self {
        Self {
            api,
            fetcher,
            reporter,
            options,
            cancel: Cancellation::never(),
        }
    }

    /// Abort polling as soon as `cancel` fires.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Create or update the app named in `spec` and wait for the triggered
    /// deployment to finish.
    ///
    /// Build and deploy logs are published as the `build_logs` and
    /// `deploy_logs` outputs whenever the deployment produced any. On a
    /// failed deployment the re-fetched app is carried by
    /// [`DeployError::DeploymentFailed`].
    pub async fn deploy(&self, spec: &AppSpec) -> Result<App, DeployError> {
        let existing = find_app_by_name(&self.api, &spec.name)
            .await
            .map_err(|e| DeployError::Resolve { source: e })?;

        let app = match existing {
            None => {
                self.reporter
                    .info(&format!("app {:?} does not exist yet, creating...", spec.name));
                self.api
                    .create_app(spec)
                    .await
                    .map_err(|e| DeployError::Create { source: e })?
            }
            Some(existing) => {
                self.reporter
                    .info(&format!("app {:?} already exists, updating...", spec.name));
                self.api
                    .update_app(&existing.id, spec)
                    .await
                    .map_err(|e| DeployError::Update { source: e })?
            }
        };

        // Create and update each enqueue exactly one deployment, which is
        // the most recent one.
        let deployments = self
            .api
            .list_deployments(&app.id, PageRequest::first(1))
            .await
            .map_err(|e| DeployError::ListDeployments {
                source: e,
                app: Box::new(app.clone()),
            })?;
        let Some(deployment_id) = deployments.items.into_iter().next().map(|d| d.id) else {
            return Err(DeployError::NoDeployment { app: Box::new(app) });
        };
        tracing::debug!(app_id = %app.id, %deployment_id, "following deployment");

        self.reporter.info("wait for deployment to finish");
        let deployment = self.wait_for_terminal(&app, &deployment_id).await?;

        self.publish_logs(&app, &deployment_id, LogKind::Build, self.options.print_build_logs)
            .await?;
        self.publish_logs(&app, &deployment_id, LogKind::Deploy, self.options.print_deploy_logs)
            .await?;

        if deployment.phase != DeploymentPhase::Active {
            let refetched = self
                .api
                .get_app(&app.id)
                .await
                .map_err(|e| DeployError::Refetch {
                    source: e,
                    app: Box::new(app.clone()),
                })?;
            return Err(DeployError::DeploymentFailed {
                phase: deployment.phase,
                app: Box::new(refetched),
            });
        }

        self.wait_for_live_url(app).await
    }

    async fn wait_for_terminal(
        &self,
        app: &App,
        deployment_id: &str,
    ) -> Result<Deployment, DeployError> {
        let mut ticker = ticker(self.options.poll_interval);
        let mut current = None;
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(DeployError::Cancelled {
                        waiting_for: "deployment",
                        app: Box::new(app.clone()),
                    });
                }
                _ = ticker.tick() => {}
            }

            let deployment = self
                .api
                .get_deployment(&app.id, deployment_id)
                .await
                .map_err(|e| DeployError::PollDeployment {
                    source: e,
                    app: Box::new(app.clone()),
                })?;

            if current != Some(deployment.phase) {
                self.reporter
                    .info(&format!("deployment is in phase: {}", deployment.phase));
                current = Some(deployment.phase);
            }

            if deployment.phase.is_terminal() {
                return Ok(deployment);
            }
        }
    }

    /// Poll until the app reports a live URL. `last` is replaced by every
    /// fetched state so errors carry the freshest one.
    async fn wait_for_live_url(&self, mut last: App) -> Result<App, DeployError> {
        let mut ticker = ticker(self.options.poll_interval);
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    return Err(DeployError::Cancelled {
                        waiting_for: "live URL",
                        app: Box::new(last),
                    });
                }
                _ = ticker.tick() => {}
            }

            last = match self.api.get_app(&last.id).await {
                Ok(app) => app,
                Err(e) => {
                    return Err(DeployError::LiveUrl {
                        source: e,
                        app: Box::new(last),
                    });
                }
            };
            if !last.live_url.is_empty() {
                return Ok(last);
            }
        }
    }

    async fn publish_logs(
        &self,
        app: &App,
        deployment_id: &str,
        kind: LogKind,
        print: bool,
    ) -> Result<(), DeployError> {
        let logs = fetch_logs(&self.api, &self.fetcher, &app.id, deployment_id, kind)
            .await
            .map_err(|e| DeployError::Logs {
                kind,
                source: e,
                app: Box::new(app.clone()),
            })?;
        if logs.is_empty() {
            return Ok(());
        }

        let logs = String::from_utf8_lossy(&logs);
        self.reporter
            .set_output(&format!("{kind}_logs"), &logs)
            .map_err(|e| DeployError::Output {
                source: e,
                app: Box::new(app.clone()),
            })?;

        if print {
            self.reporter.group(&format!("{kind} logs"));
            self.reporter.info(&logs);
            self.reporter.end_group();
        }
        Ok(())
    }
}

/// Everything after a successful create or update carries the app as last
/// seen, so the caller can still publish it.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("failed to get app")]
    Resolve { source: ApiError },

    #[error("failed to create app")]
    Create { source: ApiError },

    #[error("failed to update app")]
    Update { source: ApiError },

    #[error("failed to list deployments")]
    ListDeployments { source: ApiError, app: Box<App> },

    #[error(
        "expected a deployment right after creating/updating app {}, but got none",
        .app.id
    )]
    NoDeployment { app: Box<App> },

    #[error("failed to get deployment")]
    PollDeployment { source: ApiError, app: Box<App> },

    #[error("failed to get {kind} logs")]
    Logs {
        kind: LogKind,
        source: LogError,
        app: Box<App>,
    },

    #[error("failed to set step output")]
    Output {
        source: app_action_core::Error,
        app: Box<App>,
    },

    #[error("failed to get app after it failed")]
    Refetch { source: ApiError, app: Box<App> },

    #[error("deployment failed: {phase}")]
    DeploymentFailed { phase: DeploymentPhase, app: Box<App> },

    #[error("failed to wait for app to have a live URL")]
    LiveUrl { source: ApiError, app: Box<App> },

    #[error("cancelled while waiting for {waiting_for}")]
    Cancelled {
        waiting_for: &'static str,
        app: Box<App>,
    },
}

impl DeployError {
    /// The latest state of the app, once one was created or updated.
    pub fn app(&self) -> Option<&App> {
        match self {
            DeployError::Resolve { .. }
            | DeployError::Create { .. }
            | DeployError::Update { .. } => None,
            DeployError::ListDeployments { app, .. }
            | DeployError::NoDeployment { app }
            | DeployError::PollDeployment { app, .. }
            | DeployError::Logs { app, .. }
            | DeployError::Output { app, .. }
            | DeployError::Refetch { app, .. }
            | DeployError::DeploymentFailed { app, .. }
            | DeployError::LiveUrl { app, .. }
            | DeployError::Cancelled { app, .. } => Some(app),
        }
    }
}
