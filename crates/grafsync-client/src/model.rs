//! Grafana API request and response models

use serde::{Deserialize, Serialize};

/// Folder as returned by `GET /api/folders`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub title: String,
}

/// Entry of `GET /api/search`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardHit {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
}

impl DashboardHit {
    /// The search result uri is `db/<slug>`
    pub fn slug(&self) -> &str {
        self.uri.strip_prefix("db/").unwrap_or(&self.uri)
    }
}

/// Body of `GET /api/dashboards/db/{slug}`; only the id matters here
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DashboardSpec {
    #[serde(default)]
    pub dashboard: DashboardMeta,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DashboardMeta {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateFolderRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HomeDashboardPreference {
    pub home_dashboard_id: i64,
}
