// Error types for GrafanaClient

use std::time::Duration;

/// Errors that can occur while talking to the Grafana HTTP API
#[derive(Debug, thiserror::Error)]
pub enum GrafanaError {
    #[error("unexpected status from Grafana API (got: {status}, expected: 200): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Grafana not ready after {timeout:?}")]
    NotReady { timeout: Duration },

    #[error("could not resolve dashboard '{slug}' after {attempts} attempts: {last}")]
    SlugUnresolved {
        slug: String,
        attempts: u32,
        last: String,
    },

    #[error("invalid Grafana URL: {0}")]
    InvalidUrl(String),
}

impl GrafanaError {
    /// Status code of a non-success response, if that is what this error is
    pub fn status(&self) -> Option<u16> {
        match self {
            GrafanaError::RequestFailed { status, .. } => Some(*status),
            GrafanaError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GrafanaError>;
