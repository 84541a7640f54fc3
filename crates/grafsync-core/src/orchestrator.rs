//! Bootstrap and steady-state event consumption.
//!
//! Order at start-up:
//! 1. the home-page sequence is spawned as an independent best-effort task;
//!    it is never cancelled by the orchestrator
//! 2. the folder mapping is synced; event consumption waits for it
//! 3. events are consumed one at a time and handed to the [`ReconcileHandler`]
//!
//! Shutdown is only observed between events, so an in-flight reconcile pass
//! always runs to completion.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use grafsync_client::{GrafanaApi, ReadinessPolicy, RetryPolicy};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    annotation::AnnotationKeys,
    dedup::ContentDedupStore,
    folder::FolderResolver,
    handler::{ReconcileHandler, ReconcileReport},
    model::ConfigObject,
    shutdown::ShutdownSignal,
};

#[derive(Clone, Debug, Default)]
pub struct BootstrapSettings {
    /// Slug of the dashboard to make the org home page; `None` skips the step
    pub home_page: Option<String>,
    pub readiness: ReadinessPolicy,
    pub home_page_retry: RetryPolicy,
}

/// Outcome of [`Orchestrator::run`]
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Config objects handed to the reconcile handler
    pub processed: usize,
    /// Home-page task, if one was started. It may still be running.
    pub home_page: Option<JoinHandle<()>>,
}

pub struct Orchestrator {
    api: Arc<dyn GrafanaApi>,
    folders: Arc<FolderResolver>,
    handler: ReconcileHandler,
    settings: BootstrapSettings,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn GrafanaApi>,
        folders: Arc<FolderResolver>,
        dedup: Arc<ContentDedupStore>,
        settings: BootstrapSettings,
    ) -> Self {
        let handler = ReconcileHandler::new(api.clone(), folders.clone(), dedup);
        Self {
            api,
            folders,
            handler,
            settings,
        }
    }

    pub fn with_annotation_keys(mut self, keys: AnnotationKeys) -> Self {
        self.handler = self.handler.with_annotation_keys(keys);
        self
    }

    fn spawn_home_page(&self) -> Option<JoinHandle<()>> {
        let slug = self.settings.home_page.clone()?;
        let api = self.api.clone();
        let policy = self.settings.home_page_retry;

        Some(tokio::spawn(async move {
            match api.set_home_page(&slug, &policy).await {
                Ok(id) => info!(slug = %slug, id, "Set home page success"),
                Err(e) => warn!(slug = %slug, error = %e, "Can not set home page"),
            }
        }))
    }

    /// Sync the folder mapping. A sync failure is logged and consumption goes
    /// ahead with root folders; returns false only when shutdown interrupted it.
    async fn sync_folders(&self, shutdown: &ShutdownSignal) -> bool {
        tokio::select! {
            biased;
            _ = shutdown.wait() => {
                info!("Shutdown requested during folder sync");
                false
            }
            result = self.folders.sync(self.api.as_ref(), &self.settings.readiness) => {
                match result {
                    Ok(count) => info!(count, "Folder bootstrap complete"),
                    Err(e) => error!(
                        folders = ?self.folders.folder_names(),
                        error = %e,
                        "Can not sync folders, dashboards go to the root folder"
                    ),
                }
                true
            }
        }
    }

    /// Spawn the home-page task, sync folders, then consume `events` until the
    /// stream ends or `shutdown` fires.
    ///
    /// The home-page task is never cancelled here. Its handle is returned so
    /// the caller can await it; dropping the handle leaves it running.
    pub async fn run<S>(&self, events: S, shutdown: ShutdownSignal) -> RunSummary
    where
        S: Stream<Item = ConfigObject> + Send,
    {
        if shutdown.is_shutdown() {
            info!("Shutdown requested before start");
            return RunSummary::default();
        }

        let home_page = self.spawn_home_page();

        let processed = if self.sync_folders(&shutdown).await {
            self.consume(events, &shutdown).await
        } else {
            0
        };

        RunSummary {
            processed,
            home_page,
        }
    }

    async fn consume<S>(&self, events: S, shutdown: &ShutdownSignal) -> usize
    where
        S: Stream<Item = ConfigObject> + Send,
    {
        let mut events = std::pin::pin!(events);
        let mut processed = 0;

        loop {
            let object = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Shutdown requested, no longer consuming events");
                    break;
                }
                next = events.next() => match next {
                    Some(object) => object,
                    None => {
                        info!("Event stream ended");
                        break;
                    }
                },
            };

            let report = self.handler.on_object_observed(&object).await;
            if report != ReconcileReport::default() {
                info!(
                    object = %object.key(),
                    created = report.created,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Reconciled config object"
                );
            }
            processed += 1;
        }

        processed
    }
}
