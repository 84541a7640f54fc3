// Configuration for GrafanaClient

use std::time::Duration;

use url::Url;

use crate::error::{GrafanaError, Result};

/// Configuration for the Grafana HTTP client
#[derive(Clone, Debug)]
pub struct GrafanaClientConfig {
    /// Grafana base URL without credentials (e.g. "http://grafana:3000/sub")
    pub base_url: Url,
    /// Basic-auth username, if any
    pub username: Option<String>,
    /// Basic-auth password; ignored without a username
    pub password: Option<String>,
    /// Bearer token sent as `Authorization: Bearer <token>`
    pub bearer_token: Option<String>,
    /// Connection timeout (default: 5s)
    pub connect_timeout: Duration,
    /// Whole-request timeout (default: 30s)
    pub request_timeout: Duration,
}

impl GrafanaClientConfig {
    /// Parse a base URL. Credentials embedded as userinfo are moved into
    /// `username`/`password` and stripped from the stored URL.
    pub fn new(base_url: &str) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(GrafanaError::InvalidUrl("empty URL".to_string()));
        }
        let mut url = Url::parse(base_url)
            .map_err(|e| GrafanaError::InvalidUrl(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(GrafanaError::InvalidUrl(format!(
                "{base_url}: not a base URL"
            )));
        }

        let username = (!url.username().is_empty()).then(|| url.username().to_string());
        let password = url.password().map(str::to_string);
        let _ = url.set_username("");
        let _ = url.set_password(None);

        Ok(Self {
            base_url: url,
            username,
            password,
            bearer_token: None,
            connect_timeout: Duration::from_millis(5000),
            request_timeout: Duration::from_millis(30000),
        })
    }

    /// Set basic-auth credentials
    pub fn with_basic_auth(mut self, username: &str, password: Option<&str>) -> Self {
        self.username = Some(username.to_string());
        self.password = password.map(str::to_string);
        self
    }

    /// Set bearer token
    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }
}

/// How long and how often to poll the health endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(10 * 60),
        }
    }
}

/// Bounded fixed-delay retry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_secs(6),
        }
    }
}
