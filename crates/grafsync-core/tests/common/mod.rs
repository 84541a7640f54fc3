//! Recording fake of the Grafana API shared by the engine tests

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use grafsync_client::{
    DashboardHit, DashboardMeta, DashboardSpec, Folder, GrafanaApi, GrafanaError, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Health,
    CreateFolder(String),
    ListFolders,
    CreateDashboard(String),
    CreateDatasource(String),
    DashboardBySlug(String),
    Star(i64),
    HomeDashboard(i64),
}

#[derive(Default)]
pub struct RecordingApi {
    pub unhealthy: bool,
    pub folders: Vec<Folder>,
    /// create calls whose body contains this marker fail with a 500
    pub fail_marker: Option<&'static str>,
    pub home_dashboard_id: Option<i64>,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingApi {
    pub fn with_folders(folders: &[(i64, &str)]) -> Self {
        Self {
            folders: folders
                .iter()
                .map(|(id, title)| Folder {
                    id: *id,
                    uid: format!("uid-{id}"),
                    title: title.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn dashboards(&self) -> Vec<serde_json::Value> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateDashboard(body) => Some(serde_json::from_str(&body).unwrap()),
                _ => None,
            })
            .collect()
    }

    pub fn datasources(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateDatasource(body) => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateDashboard(_) | Call::CreateDatasource(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn create_result(&self, body: &str) -> Result<()> {
        match self.fail_marker {
            Some(marker) if body.contains(marker) => Err(GrafanaError::RequestFailed {
                status: 500,
                body: "internal".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl GrafanaApi for RecordingApi {
    async fn health(&self) -> Result<()> {
        self.record(Call::Health);
        if self.unhealthy {
            return Err(GrafanaError::RequestFailed {
                status: 503,
                body: String::new(),
            });
        }
        Ok(())
    }

    async fn search_dashboards(&self) -> Result<Vec<DashboardHit>> {
        Ok(Vec::new())
    }

    async fn create_folder(&self, title: &str) -> Result<()> {
        self.record(Call::CreateFolder(title.to_string()));
        Ok(())
    }

    async fn list_folders(&self) -> Result<Vec<Folder>> {
        self.record(Call::ListFolders);
        Ok(self.folders.clone())
    }

    async fn create_dashboard(&self, payload: &str) -> Result<()> {
        self.record(Call::CreateDashboard(payload.to_string()));
        self.create_result(payload)
    }

    async fn delete_dashboard(&self, _slug: &str) -> Result<()> {
        Ok(())
    }

    async fn create_datasource(&self, payload: &str) -> Result<()> {
        self.record(Call::CreateDatasource(payload.to_string()));
        self.create_result(payload)
    }

    async fn dashboard_by_slug(&self, slug: &str) -> Result<DashboardSpec> {
        self.record(Call::DashboardBySlug(slug.to_string()));
        match self.home_dashboard_id {
            Some(id) => Ok(DashboardSpec {
                dashboard: DashboardMeta {
                    id: Some(id),
                    title: slug.to_string(),
                },
            }),
            None => Err(GrafanaError::RequestFailed {
                status: 404,
                body: String::new(),
            }),
        }
    }

    async fn star_dashboard(&self, dashboard_id: i64) -> Result<()> {
        self.record(Call::Star(dashboard_id));
        Ok(())
    }

    async fn update_home_dashboard(&self, dashboard_id: i64) -> Result<()> {
        self.record(Call::HomeDashboard(dashboard_id));
        Ok(())
    }
}
