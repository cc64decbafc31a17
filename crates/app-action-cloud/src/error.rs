use reqwest::StatusCode;

/// Failure talking to the App Platform API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{method} {path} returned {status}: {message}")]
    Status {
        method: &'static str,
        path: String,
        status: StatusCode,
        message: String,
    },

    #[error("{method} {path} failed")]
    Transport {
        method: &'static str,
        path: String,
        source: reqwest::Error,
    },

    #[error("failed to decode response of {method} {path}")]
    Decode {
        method: &'static str,
        path: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(StatusCode::BAD_REQUEST)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Failure downloading a historic log file.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed")]
    Request { source: reqwest::Error },

    #[error("server returned {status}")]
    Status { status: StatusCode },

    #[error("failed to read response body")]
    Body { source: reqwest::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to get log URLs")]
    Descriptor { source: ApiError },

    #[error("failed to get historic logs from {url}")]
    Fetch { url: String, source: FetchError },
}
