//! grafsync core - reconciliation engine
//!
//! Turns observed config objects into Grafana writes:
//! - `annotation`: per-object intent from annotations
//! - `dedup`: content-addressed at-most-once create guard
//! - `folder`: folder title to id resolution
//! - `handler`: per-object reconcile pass
//! - `orchestrator`: bootstrap sequence and serialized event consumption

pub mod annotation;
pub mod dedup;
pub mod error;
pub mod folder;
pub mod handler;
pub mod model;
pub mod orchestrator;
pub mod shutdown;

pub use annotation::{AnnotationKeys, Intent, parse_bool};
pub use dedup::{ContentDedupStore, content_hash};
pub use error::ReconcileError;
pub use folder::FolderResolver;
pub use handler::{ReconcileHandler, ReconcileReport};
pub use model::ConfigObject;
pub use orchestrator::{BootstrapSettings, Orchestrator, RunSummary};
pub use shutdown::ShutdownSignal;

/// Folder id used when no folder is requested or the folder is unknown
pub const ROOT_FOLDER_ID: i64 = 0;
