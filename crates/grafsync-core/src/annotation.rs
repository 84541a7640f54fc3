//! Annotation interpretation
//!
//! Annotations are intent, not configuration: a missing or unparseable flag
//! means "not for us" and is never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DASHBOARD_KEY: &str = "grafana.net/dashboards";
pub const DEFAULT_DATASOURCE_KEY: &str = "grafana.net/datasource";
pub const DEFAULT_FOLDER_KEY: &str = "grafana.net/folder";

/// Annotation keys the interpreter recognizes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationKeys {
    /// Enables dashboard-entry processing
    #[serde(default = "default_dashboard_key")]
    pub dashboard_flag: String,
    /// Enables datasource-entry processing
    #[serde(default = "default_datasource_key")]
    pub datasource_flag: String,
    /// Selects the target folder for dashboard entries
    #[serde(default = "default_folder_key")]
    pub folder_name: String,
}

fn default_dashboard_key() -> String {
    DEFAULT_DASHBOARD_KEY.to_string()
}

fn default_datasource_key() -> String {
    DEFAULT_DATASOURCE_KEY.to_string()
}

fn default_folder_key() -> String {
    DEFAULT_FOLDER_KEY.to_string()
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self {
            dashboard_flag: default_dashboard_key(),
            datasource_flag: default_datasource_key(),
            folder_name: default_folder_key(),
        }
    }
}

/// What a config object asks for
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Intent {
    pub is_dashboard_set: bool,
    pub is_datasource_set: bool,
    pub folder_name: Option<String>,
}

impl Intent {
    pub fn from_annotations(annotations: &BTreeMap<String, String>, keys: &AnnotationKeys) -> Self {
        let flag = |key: &str| {
            annotations
                .get(key)
                .and_then(|v| parse_bool(v))
                .unwrap_or(false)
        };

        Self {
            is_dashboard_set: flag(&keys.dashboard_flag),
            is_datasource_set: flag(&keys.datasource_flag),
            folder_name: annotations
                .get(&keys.folder_name)
                .filter(|v| !v.is_empty())
                .cloned(),
        }
    }

    /// True when the object should be processed at all
    pub fn is_relevant(&self) -> bool {
        self.is_dashboard_set || self.is_datasource_set
    }
}

/// Boolean spellings accepted in annotation values
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
