use std::fmt;

use app_action_core::AppSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// The App Platform operations this action relies on.
///
/// Production code uses [`DoClient`](crate::DoClient), tests use
/// mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait AppsApi: Send + Sync {
    /// List one page of the account's apps.
    async fn list_apps(&self, page: PageRequest) -> Result<Page<App>, ApiError>;

    async fn create_app(&self, spec: &AppSpec) -> Result<App, ApiError>;

    async fn update_app(&self, app_id: &str, spec: &AppSpec) -> Result<App, ApiError>;

    async fn get_app(&self, app_id: &str) -> Result<App, ApiError>;

    /// List an app's deployments, most recent first.
    async fn list_deployments(
        &self,
        app_id: &str,
        page: PageRequest,
    ) -> Result<Page<Deployment>, ApiError>;

    async fn get_deployment(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> Result<Deployment, ApiError>;

    /// Get the log descriptor of a deployment.
    async fn get_logs(
        &self,
        app_id: &str,
        deployment_id: &str,
        query: &LogQuery,
    ) -> Result<LogDescriptor, ApiError>;

    async fn delete_app(&self, app_id: &str) -> Result<(), ApiError>;
}

/// 1-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 20;

    pub fn first(per_page: u32) -> Self {
        Self { page: 1, per_page }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(Self::DEFAULT_PER_PAGE)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether the API reported this as the last page.
    pub is_last: bool,
}

/// An application as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<AppSpec>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub live_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl App {
    pub fn spec_name(&self) -> Option<&str> {
        self.spec.as_ref().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub phase: DeploymentPhase,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lifecycle state of a deployment. Only the platform moves it forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentPhase {
    PendingBuild,
    Building,
    PendingDeploy,
    Deploying,
    Active,
    Superseded,
    Error,
    Canceled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeploymentPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Active | Self::Error | Self::Canceled | Self::Superseded
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::PendingBuild => "PENDING_BUILD",
            Self::Building => "BUILDING",
            Self::PendingDeploy => "PENDING_DEPLOY",
            Self::Deploying => "DEPLOYING",
            Self::Active => "ACTIVE",
            Self::Superseded => "SUPERSEDED",
            Self::Error => "ERROR",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogKind {
    Build,
    Deploy,
    Run,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "BUILD",
            Self::Deploy => "DEPLOY",
            Self::Run => "RUN",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Build => "build",
            Self::Deploy => "deploy",
            Self::Run => "run",
        })
    }
}

/// Parameters of a log descriptor request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// `None` aggregates all components.
    pub component: Option<String>,
    pub kind: LogKind,
    pub follow: bool,
    /// `None` returns everything.
    pub tail_lines: Option<u32>,
}

impl LogQuery {
    /// All historic logs of `kind` for every component.
    pub fn historic(kind: LogKind) -> Self {
        Self {
            component: None,
            kind,
            follow: false,
            tail_lines: None,
        }
    }
}

/// Where a deployment's logs can be downloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDescriptor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub live_url: String,
    #[serde(default)]
    pub historic_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        let terminal: Vec<_> = [
            DeploymentPhase::Unknown,
            DeploymentPhase::PendingBuild,
            DeploymentPhase::Building,
            DeploymentPhase::PendingDeploy,
            DeploymentPhase::Deploying,
            DeploymentPhase::Active,
            DeploymentPhase::Superseded,
            DeploymentPhase::Error,
            DeploymentPhase::Canceled,
        ]
        .into_iter()
        .filter(|p| p.is_terminal())
        .collect();

        assert_eq!(
            terminal,
            vec![
                DeploymentPhase::Active,
                DeploymentPhase::Superseded,
                DeploymentPhase::Error,
                DeploymentPhase::Canceled,
            ]
        );
    }

    #[test]
    fn phase_round_trips_through_wire_names() {
        let phase: DeploymentPhase = serde_json::from_str("\"PENDING_DEPLOY\"").unwrap();
        assert_eq!(phase, DeploymentPhase::PendingDeploy);
        assert_eq!(phase.to_string(), "PENDING_DEPLOY");
        assert_eq!(serde_json::to_string(&phase).unwrap(), "\"PENDING_DEPLOY\"");
    }

    #[test]
    fn unknown_phases_parse_as_unknown() {
        let phase: DeploymentPhase = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(phase, DeploymentPhase::Unknown);
    }

    #[test]
    fn app_keeps_unmodeled_fields() {
        let app: App = serde_json::from_str(
            r#"{"id": "a1", "live_url": "https://x", "region": {"slug": "nyc"}, "spec": {"name": "foo"}}"#,
        )
        .unwrap();
        assert_eq!(app.spec_name(), Some("foo"));
        assert_eq!(app.extra["region"]["slug"], "nyc");
    }
}
