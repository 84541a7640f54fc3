use std::sync::Arc;

use anyhow::bail;
use grafsync_client::GrafanaClient;
use grafsync_core::{ContentDedupStore, FolderResolver, Orchestrator, ShutdownSignal};
use grafsync_server::{
    Settings,
    source::ConfigMapSource,
    startup::{LoggingConfig, init_logging, join_task, spawn_signal_listener},
};
use tracing::{error, info};

const EVENT_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logging_guard = init_logging(&LoggingConfig::from_env())?;

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid settings");
            return Err(e);
        }
    };

    let client = GrafanaClient::new(settings.client_config()?)?;
    info!(
        grafana = %client.config().base_url,
        folders = %settings.grafana_folder,
        home_page = %settings.grafana_homepage,
        "Starting grafsync"
    );

    let shutdown = ShutdownSignal::new();
    let signal_listener = spawn_signal_listener(shutdown.clone());

    let source = match ConfigMapSource::connect(
        settings.run_outside_cluster,
        settings.namespace.clone(),
    )
    .await
    {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Failed to connect to Kubernetes");
            return Err(e);
        }
    };
    let (events, watcher) = source.spawn(shutdown.clone(), EVENT_BUFFER);

    let orchestrator = Orchestrator::new(
        Arc::new(client),
        Arc::new(FolderResolver::from_csv(&settings.grafana_folder)),
        Arc::new(ContentDedupStore::new()),
        settings.bootstrap(),
    )
    .with_annotation_keys(settings.annotations.clone());

    let summary = orchestrator.run(events, shutdown.clone()).await;
    info!(processed = summary.processed, "Event loop finished");

    let stopped_by_signal = shutdown.is_shutdown();
    shutdown.shutdown();
    join_task("configmap-watcher", watcher).await;
    signal_listener.abort();

    if !stopped_by_signal {
        bail!("ConfigMap watch ended unexpectedly");
    }

    info!("grafsync stopped");
    Ok(())
}
