use crate::api::{AppsApi, LogKind, LogQuery};
use crate::error::{FetchError, LogError};

/// Downloads the content behind a historic log URL.
#[allow(async_fn_in_trait)]
pub trait LogFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Plain unauthenticated GET. Historic log URLs are pre-signed.
#[derive(Default)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request { source: e })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body { source: e })?;
        Ok(body.to_vec())
    }
}

/// Collect the historic `kind` logs of a deployment.
///
/// The content of every historic URL is concatenated in order. A 400 from
/// the descriptor endpoint means no logs of this kind exist (e.g. nothing
/// was built) and yields empty output; any other failure is returned.
pub async fn fetch_logs<A, F>(
    api: &A,
    fetcher: &F,
    app_id: &str,
    deployment_id: &str,
    kind: LogKind,
) -> Result<Vec<u8>, LogError>
where
    A: AppsApi,
    F: LogFetcher,
{
    let descriptor = match api
        .get_logs(app_id, deployment_id, &LogQuery::historic(kind))
        .await
    {
        Ok(descriptor) => descriptor,
        Err(e) if e.is_bad_request() => {
            tracing::debug!(%kind, deployment_id, "no logs available");
            return Ok(Vec::new());
        }
        Err(e) => return Err(LogError::Descriptor { source: e }),
    };

    let mut logs = Vec::new();
    for url in &descriptor.historic_urls {
        let chunk = fetcher.fetch(url).await.map_err(|e| LogError::Fetch {
            url: url.clone(),
            source: e,
        })?;
        logs.extend_from_slice(&chunk);
    }
    Ok(logs)
}
