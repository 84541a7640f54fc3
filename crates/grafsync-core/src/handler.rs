//! Per-object reconcile pass.
//!
//! For every observed object: interpret annotations, resolve the target
//! folder, then submit each entry whose content has not been submitted before.
//! Entry failures are logged and never stop sibling entries.

use std::{fmt, sync::Arc};

use grafsync_client::GrafanaApi;
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use serde_json::value::RawValue;
use tracing::{debug, error, info, warn};

use crate::{
    ROOT_FOLDER_ID,
    annotation::{AnnotationKeys, Intent},
    dedup::{ContentDedupStore, content_hash},
    error::ReconcileError,
    folder::FolderResolver,
    model::ConfigObject,
};

/// Outcome counts of one reconcile pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EntryKind {
    Dashboard { folder_id: i64 },
    Datasource,
}

pub struct ReconcileHandler {
    api: Arc<dyn GrafanaApi>,
    folders: Arc<FolderResolver>,
    dedup: Arc<ContentDedupStore>,
    keys: AnnotationKeys,
}

impl ReconcileHandler {
    pub fn new(
        api: Arc<dyn GrafanaApi>,
        folders: Arc<FolderResolver>,
        dedup: Arc<ContentDedupStore>,
    ) -> Self {
        Self {
            api,
            folders,
            dedup,
            keys: AnnotationKeys::default(),
        }
    }

    pub fn with_annotation_keys(mut self, keys: AnnotationKeys) -> Self {
        self.keys = keys;
        self
    }

    pub async fn on_object_observed(&self, object: &ConfigObject) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let intent = Intent::from_annotations(&object.annotations, &self.keys);
        if !intent.is_relevant() {
            debug!(object = %object.key(), "Skipping config object without intent");
            return report;
        }

        // Datasource wins when both flags are set.
        let kind = if intent.is_datasource_set {
            EntryKind::Datasource
        } else {
            EntryKind::Dashboard {
                folder_id: self.resolve_folder(object, intent.folder_name.as_deref()),
            }
        };

        for (entry, payload) in &object.data {
            if self.dedup.check_and_mark(&content_hash(payload)) {
                info!(object = %object.key(), entry = %entry, "Content already submitted, skipped");
                report.skipped += 1;
                continue;
            }

            match self.submit(kind, entry, payload).await {
                Ok(()) => {
                    info!(object = %object.key(), entry = %entry, "Created");
                    report.created += 1;
                }
                Err(e) => {
                    error!(object = %object.key(), entry = %entry, error = %e, "Failed to create");
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn resolve_folder(&self, object: &ConfigObject, folder_name: Option<&str>) -> i64 {
        let Some(name) = folder_name else {
            return ROOT_FOLDER_ID;
        };
        match self.folders.lookup(name) {
            Some(id) => {
                debug!(object = %object.key(), folder = name, folder_id = id, "Resolved folder");
                id
            }
            None => {
                warn!(object = %object.key(), folder = name, "Folder is not known, using root folder");
                ROOT_FOLDER_ID
            }
        }
    }

    async fn submit(&self, kind: EntryKind, entry: &str, payload: &str) -> Result<(), ReconcileError> {
        match kind {
            EntryKind::Datasource => {
                info!(entry, "Creating datasource");
                self.api.create_datasource(payload).await?;
            }
            EntryKind::Dashboard { folder_id } => {
                let body = inject_folder_id(entry, payload, folder_id)?;
                info!(entry, folder_id, "Creating dashboard");
                self.api.create_dashboard(&body).await?;
            }
        }
        Ok(())
    }
}

const FOLDER_ID_FIELD: &str = "folderId";

/// Top-level members of a JSON object in document order. Values are kept as
/// the exact source text.
struct TopLevelMembers(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for TopLevelMembers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MembersVisitor;

        impl<'de> Visitor<'de> for MembersVisitor {
            type Value = TopLevelMembers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut members = Vec::new();
                while let Some(member) = map.next_entry::<String, Box<RawValue>>()? {
                    members.push(member);
                }
                Ok(TopLevelMembers(members))
            }
        }

        deserializer.deserialize_map(MembersVisitor)
    }
}

/// Set top-level `folderId` on a dashboard document. Only that member is
/// rewritten; every other member keeps its position and source text.
fn inject_folder_id(entry: &str, payload: &str, folder_id: i64) -> Result<String, ReconcileError> {
    let invalid = |reason: String| ReconcileError::InvalidPayload {
        entry: entry.to_string(),
        reason,
    };

    let TopLevelMembers(members) =
        serde_json::from_str(payload).map_err(|e| invalid(e.to_string()))?;

    let folder_id = folder_id.to_string();
    let mut body = String::with_capacity(payload.len() + FOLDER_ID_FIELD.len() + 24);
    let mut replaced = false;

    body.push('{');
    for (key, value) in &members {
        let value = if key == FOLDER_ID_FIELD {
            replaced = true;
            folder_id.as_str()
        } else {
            value.get()
        };
        if body.len() > 1 {
            body.push(',');
        }
        body.push_str(&serde_json::to_string(key).map_err(|e| invalid(e.to_string()))?);
        body.push(':');
        body.push_str(value);
    }
    if !replaced {
        if body.len() > 1 {
            body.push(',');
        }
        body.push_str("\"folderId\":");
        body.push_str(&folder_id);
    }
    body.push('}');

    Ok(body)
}
