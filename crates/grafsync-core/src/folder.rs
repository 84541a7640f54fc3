//! Folder title -> id resolution.
//!
//! The mapping is rebuilt wholesale by [`FolderResolver::sync`] and swapped in
//! under a lock; lookups never touch the network.

use std::{collections::HashMap, sync::Arc};

use grafsync_client::{GrafanaApi, ReadinessPolicy, Result};
use parking_lot::RwLock;
use tracing::{info, warn};

pub struct FolderResolver {
    folder_names: Vec<String>,
    folders: RwLock<Arc<HashMap<String, i64>>>,
}

impl FolderResolver {
    pub fn new(folder_names: Vec<String>) -> Self {
        Self {
            folder_names,
            folders: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Build from a comma-separated list; blanks are dropped
    pub fn from_csv(folder_names: &str) -> Self {
        Self::new(
            folder_names
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn folder_names(&self) -> &[String] {
        &self.folder_names
    }

    /// Wait for Grafana, create the configured folders (best effort), then
    /// replace the mapping with the authoritative listing.
    ///
    /// On error the previous mapping is left untouched.
    pub async fn sync(&self, api: &dyn GrafanaApi, readiness: &ReadinessPolicy) -> Result<usize> {
        api.wait_until_ready(readiness).await?;

        for name in &self.folder_names {
            if let Err(e) = api.create_folder(name).await {
                // Usually "already exists"; the listing below decides.
                warn!(folder = %name, error = %e, "Failed to create folder");
            }
        }

        let listing = api.list_folders().await?;
        let mapping: HashMap<String, i64> = listing.into_iter().map(|f| (f.title, f.id)).collect();
        let count = mapping.len();

        *self.folders.write() = Arc::new(mapping);
        info!(count, "Folder mapping refreshed");
        Ok(count)
    }

    pub fn lookup(&self, title: &str) -> Option<i64> {
        self.folders.read().get(title).copied()
    }

    #[cfg(test)]
    fn snapshot(&self) -> Arc<HashMap<String, i64>> {
        self.folders.read().clone()
    }
}
