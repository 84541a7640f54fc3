//! The seam between the reconcile engine and Grafana.
//!
//! Implementors provide the single-request primitives. The multi-step
//! sequences (readiness wait, slug resolution, home-page update) are provided
//! methods built on those primitives, so every implementation shares the same
//! retry semantics.

use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::{
    config::{ReadinessPolicy, RetryPolicy},
    error::{GrafanaError, Result},
    model::{DashboardHit, DashboardSpec, Folder},
};

#[async_trait]
pub trait GrafanaApi: Send + Sync {
    /// `GET /api/health`; Ok only on 200
    async fn health(&self) -> Result<()>;

    async fn search_dashboards(&self) -> Result<Vec<DashboardHit>>;

    async fn create_folder(&self, title: &str) -> Result<()>;

    async fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Import a dashboard document. The body is sent as-is.
    async fn create_dashboard(&self, payload: &str) -> Result<()>;

    async fn delete_dashboard(&self, slug: &str) -> Result<()>;

    /// Create a datasource. The body is sent as-is.
    async fn create_datasource(&self, payload: &str) -> Result<()>;

    async fn dashboard_by_slug(&self, slug: &str) -> Result<DashboardSpec>;

    async fn star_dashboard(&self, dashboard_id: i64) -> Result<()>;

    async fn update_home_dashboard(&self, dashboard_id: i64) -> Result<()>;

    /// Poll the health endpoint every `policy.interval` until it succeeds or
    /// `policy.timeout` has elapsed.
    async fn wait_until_ready(&self, policy: &ReadinessPolicy) -> Result<()> {
        let deadline = Instant::now() + policy.timeout;
        loop {
            match self.health().await {
                Ok(()) => {
                    debug!("Grafana is ready");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Grafana health check failed, retrying in {:?}", policy.interval);
                }
            }

            if Instant::now() + policy.interval > deadline {
                return Err(GrafanaError::NotReady {
                    timeout: policy.timeout,
                });
            }
            sleep(policy.interval).await;
        }
    }

    /// Resolve a dashboard slug to its numeric id. Every attempt is preceded
    /// by `policy.delay`; the first response carrying an id wins.
    async fn resolve_dashboard_id(&self, slug: &str, policy: &RetryPolicy) -> Result<i64> {
        let mut last = String::from("no attempts configured");

        for attempt in 1..=policy.attempts {
            sleep(policy.delay).await;
            match self.dashboard_by_slug(slug).await {
                Ok(spec) => match spec.dashboard.id {
                    Some(id) => {
                        debug!(slug, id, attempt, "Resolved dashboard id");
                        return Ok(id);
                    }
                    None => last = "response did not contain dashboard.id".to_string(),
                },
                Err(e) => last = e.to_string(),
            }
            debug!(slug, attempt, reason = %last, "Dashboard id not available yet");
        }

        Err(GrafanaError::SlugUnresolved {
            slug: slug.to_string(),
            attempts: policy.attempts,
            last,
        })
    }

    /// Resolve `slug`, star the dashboard, then make it the org home page.
    /// A failing step aborts the rest; completed steps are not undone.
    async fn set_home_page(&self, slug: &str, policy: &RetryPolicy) -> Result<i64> {
        info!(slug, "Setting home page");
        let id = self.resolve_dashboard_id(slug, policy).await?;
        self.star_dashboard(id).await?;
        self.update_home_dashboard(id).await?;
        info!(slug, id, "Changed home page");
        Ok(id)
    }
}
