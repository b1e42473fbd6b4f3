use reqwest::StatusCode;
use thiserror::Error as ThisError;

use crate::backend::MISSING_CONFIG_ADVISORY;

/// Failure of a single read against the REST endpoint.
///
/// `Display` is the text shown to users; backend messages pass through unchanged.
#[derive(Debug, ThisError)]
pub enum FetchError {
    /// No client handle: endpoint URL or access key is not configured.
    #[error("{}", MISSING_CONFIG_ADVISORY)]
    Unavailable,

    #[error("{message}")]
    Backend {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },

    #[error("Backend responded with status {0}")]
    Status(StatusCode),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// HTTP status reported by the backend, when the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Backend { status, .. } | FetchError::Status(status) => Some(*status),
            FetchError::Request(e) => e.status(),
            FetchError::Unavailable | FetchError::Decode(_) => None,
        }
    }
}
