//! reqwest-backed implementation of [`GrafanaApi`].
//!
//! Every request carries the configured credentials; write requests also carry
//! `Content-Type: application/json`. Success is exactly HTTP 200. The client
//! never retries on its own; retry policy lives in the provided sequences of
//! [`GrafanaApi`].

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{
    api::GrafanaApi,
    config::GrafanaClientConfig,
    constants::api_path,
    error::{GrafanaError, Result},
    model::{CreateFolderRequest, DashboardHit, DashboardSpec, Folder, HomeDashboardPreference},
};

const APPLICATION_JSON: &str = "application/json";

/// Grafana HTTP API client
pub struct GrafanaClient {
    client: Client,
    config: GrafanaClientConfig,
}

impl GrafanaClient {
    pub fn new(config: GrafanaClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client for a base URL with no extra credentials
    pub fn from_url(base_url: &str) -> Result<Self> {
        Self::new(GrafanaClientConfig::new(base_url)?)
    }

    pub fn config(&self) -> &GrafanaClientConfig {
        &self.config
    }

    /// Join an API path onto the base URL, keeping any sub-path of the base
    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.build_url(path);
        debug!(%method, %url, "Grafana request");

        let mut builder = self.client.request(method.clone(), url);
        if method != Method::GET && method != Method::HEAD {
            builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
        }
        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_deref());
        }
        if let Some(token) = &self.config.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send and require a 200, discarding the body
    async fn execute(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Send, require a 200 and decode the JSON body
    async fn execute_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GrafanaError::RequestFailed {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl GrafanaApi for GrafanaClient {
    async fn health(&self) -> Result<()> {
        self.execute(self.request(Method::GET, api_path::HEALTH))
            .await
    }

    async fn search_dashboards(&self) -> Result<Vec<DashboardHit>> {
        self.execute_json(self.request(Method::GET, api_path::SEARCH))
            .await
    }

    async fn create_folder(&self, title: &str) -> Result<()> {
        let body = serde_json::to_vec(&CreateFolderRequest { title })?;
        info!(title, "Creating folder");
        self.execute(self.request(Method::POST, api_path::FOLDERS).body(body))
            .await
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        self.execute_json(self.request(Method::GET, api_path::FOLDERS))
            .await
    }

    async fn create_dashboard(&self, payload: &str) -> Result<()> {
        self.execute(
            self.request(Method::POST, api_path::DASHBOARD_IMPORT)
                .body(payload.to_owned()),
        )
        .await
    }

    async fn delete_dashboard(&self, slug: &str) -> Result<()> {
        let path = format!("{}/{}", api_path::DASHBOARD_BY_SLUG, slug);
        self.execute(self.request(Method::DELETE, &path)).await
    }

    async fn create_datasource(&self, payload: &str) -> Result<()> {
        self.execute(
            self.request(Method::POST, api_path::DATASOURCES)
                .body(payload.to_owned()),
        )
        .await
    }

    async fn dashboard_by_slug(&self, slug: &str) -> Result<DashboardSpec> {
        let path = format!("{}/{}", api_path::DASHBOARD_BY_SLUG, slug);
        self.execute_json(self.request(Method::GET, &path)).await
    }

    async fn star_dashboard(&self, dashboard_id: i64) -> Result<()> {
        let path = format!("{}/{}", api_path::USER_STAR_DASHBOARD, dashboard_id);
        self.execute(self.request(Method::POST, &path)).await
    }

    async fn update_home_dashboard(&self, dashboard_id: i64) -> Result<()> {
        let body = serde_json::to_vec(&HomeDashboardPreference {
            home_dashboard_id: dashboard_id,
        })?;
        self.execute(self.request(Method::PUT, api_path::ORG_PREFERENCES).body(body))
            .await
    }
}
