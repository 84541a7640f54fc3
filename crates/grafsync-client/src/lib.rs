// grafsync-client: Grafana HTTP API client

pub mod api;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;

pub use api::GrafanaApi;
pub use client::GrafanaClient;
pub use config::{GrafanaClientConfig, ReadinessPolicy, RetryPolicy};
pub use error::{GrafanaError, Result};
pub use model::{DashboardHit, DashboardMeta, DashboardSpec, Folder};
