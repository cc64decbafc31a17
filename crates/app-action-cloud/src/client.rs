use app_action_core::AppSpec;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::api::{App, AppsApi, Deployment, LogDescriptor, LogQuery, Page, PageRequest};
use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

/// App Platform REST client authenticated with a personal access token.
pub struct DoClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl DoClient {
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    pub fn with_base_url(token: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token,
        }
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Vec<u8>, ApiError> {
        let method_name = method_name(&method);
        let request = self
            .http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(self.token.expose_secret());

        let response = build(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                method: method_name,
                path: path.to_owned(),
                source: e,
            })?;

        let status = response.status();
        tracing::debug!(method = method_name, path, %status, "app platform request");

        let body = response.bytes().await.map_err(|e| ApiError::Transport {
            method: method_name,
            path: path.to_owned(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method: method_name,
                path: path.to_owned(),
                status,
                message: error_message(&body),
            });
        }

        Ok(body.to_vec())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, ApiError> {
        let method_name = method_name(&method);
        let body = self.execute(method, path, build).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
            method: method_name,
            path: path.to_owned(),
            source: e,
        })
    }
}

impl AppsApi for DoClient {
    async fn list_apps(&self, page: PageRequest) -> Result<Page<App>, ApiError> {
        let resp: AppsResponse = self
            .call(Method::GET, "/v2/apps", |r| r.query(&page_query(page)))
            .await?;
        Ok(Page {
            items: resp.apps,
            is_last: is_last_page(resp.links.as_ref()),
        })
    }

    async fn create_app(&self, spec: &AppSpec) -> Result<App, ApiError> {
        let resp: AppResponse = self
            .call(Method::POST, "/v2/apps", |r| r.json(&SpecRequest { spec }))
            .await?;
        Ok(resp.app)
    }

    async fn update_app(&self, app_id: &str, spec: &AppSpec) -> Result<App, ApiError> {
        let path = format!("/v2/apps/{app_id}");
        let resp: AppResponse = self
            .call(Method::PUT, &path, |r| r.json(&SpecRequest { spec }))
            .await?;
        Ok(resp.app)
    }

    async fn get_app(&self, app_id: &str) -> Result<App, ApiError> {
        let path = format!("/v2/apps/{app_id}");
        let resp: AppResponse = self.call(Method::GET, &path, |r| r).await?;
        Ok(resp.app)
    }

    async fn list_deployments(
        &self,
        app_id: &str,
        page: PageRequest,
    ) -> Result<Page<Deployment>, ApiError> {
        let path = format!("/v2/apps/{app_id}/deployments");
        let resp: DeploymentsResponse = self
            .call(Method::GET, &path, |r| r.query(&page_query(page)))
            .await?;
        Ok(Page {
            items: resp.deployments,
            is_last: is_last_page(resp.links.as_ref()),
        })
    }

    async fn get_deployment(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> Result<Deployment, ApiError> {
        let path = format!("/v2/apps/{app_id}/deployments/{deployment_id}");
        let resp: DeploymentResponse = self.call(Method::GET, &path, |r| r).await?;
        Ok(resp.deployment)
    }

    async fn get_logs(
        &self,
        app_id: &str,
        deployment_id: &str,
        query: &LogQuery,
    ) -> Result<LogDescriptor, ApiError> {
        let path = match &query.component {
            Some(component) => format!(
                "/v2/apps/{app_id}/deployments/{deployment_id}/components/{component}/logs"
            ),
            None => format!("/v2/apps/{app_id}/deployments/{deployment_id}/logs"),
        };

        let mut params = vec![
            ("type", query.kind.as_str().to_owned()),
            ("follow", query.follow.to_string()),
        ];
        if let Some(tail) = query.tail_lines {
            params.push(("tail_lines", tail.to_string()));
        }

        self.call(Method::GET, &path, |r| r.query(&params)).await
    }

    async fn delete_app(&self, app_id: &str) -> Result<(), ApiError> {
        let path = format!("/v2/apps/{app_id}");
        self.execute(Method::DELETE, &path, |r| r).await?;
        Ok(())
    }
}

// ── Wire types ──

#[derive(serde::Serialize)]
struct SpecRequest<'a> {
    spec: &'a AppSpec,
}

#[derive(Deserialize)]
struct AppResponse {
    app: App,
}

#[derive(Deserialize)]
struct AppsResponse {
    #[serde(default)]
    apps: Vec<App>,
    links: Option<Links>,
}

#[derive(Deserialize)]
struct DeploymentResponse {
    deployment: Deployment,
}

#[derive(Deserialize)]
struct DeploymentsResponse {
    #[serde(default)]
    deployments: Vec<Deployment>,
    links: Option<Links>,
}

#[derive(Deserialize)]
struct Links {
    pages: Option<Pages>,
}

#[derive(Deserialize)]
struct Pages {
    next: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// ── Helpers ──

fn page_query(page: PageRequest) -> [(&'static str, u32); 2] {
    [("page", page.page), ("per_page", page.per_page)]
}

fn is_last_page(links: Option<&Links>) -> bool {
    links
        .and_then(|l| l.pages.as_ref())
        .and_then(|p| p.next.as_deref())
        .is_none_or(str::is_empty)
}

fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => err.message,
        Err(_) => String::from_utf8_lossy(body).trim().to_owned(),
    }
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        _ => "REQUEST",
    }
}
