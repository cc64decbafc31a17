#![allow(dead_code)]

use app_action_cloud::api::{
    App, AppsApi, Deployment, DeploymentPhase, LogDescriptor, LogQuery, Page, PageRequest,
};
use app_action_cloud::error::{ApiError, FetchError};
use app_action_cloud::logs::LogFetcher;
use app_action_core::{AppSpec, GitHubActions};
use mockall::mock;
use reqwest::StatusCode;

mock! {
    pub Api {}

    impl AppsApi for Api {
        async fn list_apps(&self, page: PageRequest) -> Result<Page<App>, ApiError>;
        async fn create_app(&self, spec: &AppSpec) -> Result<App, ApiError>;
        async fn update_app(&self, app_id: &str, spec: &AppSpec) -> Result<App, ApiError>;
        async fn get_app(&self, app_id: &str) -> Result<App, ApiError>;
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
        async fn get_logs(
            &self,
            app_id: &str,
            deployment_id: &str,
            query: &LogQuery,
        ) -> Result<LogDescriptor, ApiError>;
        async fn delete_app(&self, app_id: &str) -> Result<(), ApiError>;
    }
}

mock! {
    pub Fetcher {}

    impl LogFetcher for Fetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
    }
}

pub fn app(id: &str, name: &str) -> App {
    App {
        id: id.to_owned(),
        spec: Some(AppSpec {
            name: name.to_owned(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn live(mut app: App, url: &str) -> App {
    app.live_url = url.to_owned();
    app
}

pub fn deployment(id: &str, phase: DeploymentPhase) -> Deployment {
    Deployment {
        id: id.to_owned(),
        phase,
        ..Default::default()
    }
}

pub fn page<T>(items: Vec<T>, is_last: bool) -> Page<T> {
    Page { items, is_last }
}

pub fn api_error(status: u16) -> ApiError {
    ApiError::Status {
        method: "GET",
        path: "/v2/apps".to_owned(),
        status: StatusCode::from_u16(status).unwrap(),
        message: "boom".to_owned(),
    }
}

pub fn descriptor(urls: &[&str]) -> LogDescriptor {
    LogDescriptor {
        historic_urls: urls.iter().map(|u| (*u).to_owned()).collect(),
        ..Default::default()
    }
}

/// A reporter writing the step log into memory.
pub fn reporter(output_file: Option<std::path::PathBuf>) -> GitHubActions<Vec<u8>> {
    GitHubActions::with_writer(Vec::new(), output_file)
}

pub fn log_of(reporter: GitHubActions<Vec<u8>>) -> String {
    String::from_utf8(reporter.into_writer()).unwrap()
}
