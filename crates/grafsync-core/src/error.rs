use grafsync_client::GrafanaError;

/// Failure of a single entry within a reconcile pass
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("entry '{entry}' is not a usable dashboard document: {reason}")]
    InvalidPayload { entry: String, reason: String },

    #[error(transparent)]
    Api(#[from] GrafanaError),
}
