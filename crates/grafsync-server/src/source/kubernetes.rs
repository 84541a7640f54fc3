//! ConfigMap watch source
//!
//! Watches ConfigMaps in one namespace and forwards every added or updated
//! object as a [`ConfigObject`]. Deletions are observed and logged only;
//! Grafana objects are never removed from here.

use futures::StreamExt;
use grafsync_core::{ConfigObject, ShutdownSignal};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{
    Api, Client, Config,
    config::KubeConfigOptions,
    runtime::{
        WatchStreamExt,
        watcher::{self, Event},
    },
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

pub struct ConfigMapSource {
    client: Client,
    namespace: String,
}

impl ConfigMapSource {
    /// Connect using the in-cluster service account, or the local kubeconfig
    /// when running outside the cluster. `namespace` falls back to the
    /// namespace of the loaded config.
    pub async fn connect(
        run_outside_cluster: bool,
        namespace: Option<String>,
    ) -> anyhow::Result<Self> {
        let config = if run_outside_cluster {
            Config::from_kubeconfig(&KubeConfigOptions::default()).await?
        } else {
            Config::incluster()?
        };

        let namespace = namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| config.default_namespace.clone());
        let client = Client::try_from(config)?;

        info!(namespace = %namespace, outside_cluster = run_outside_cluster, "Connected to Kubernetes");
        Ok(Self { client, namespace })
    }

    /// Start the watch loop. Objects are delivered on the returned stream in
    /// observation order; the stream ends when the loop stops.
    pub fn spawn(
        self,
        shutdown: ShutdownSignal,
        capacity: usize,
    ) -> (ReceiverStream<ConfigObject>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(self.watch(tx, shutdown));
        (ReceiverStream::new(rx), handle)
    }

    async fn watch(self, tx: mpsc::Sender<ConfigObject>, shutdown: ShutdownSignal) {
        let api: Api<ConfigMap> = Api::namespaced(self.client, &self.namespace);

        info!(namespace = %self.namespace, "Starting ConfigMap watcher");

        let stream = watcher::watcher(api, watcher::Config::default()).default_backoff();
        let mut stream = std::pin::pin!(stream);

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                next = stream.next() => next,
            };

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    warn!(error = %e, "ConfigMap watch error, retrying");
                    continue;
                }
                None => {
                    error!("ConfigMap watch stream ended");
                    break;
                }
            };

            match event {
                Event::Apply(cm) | Event::InitApply(cm) => {
                    let object = to_config_object(&cm);
                    debug!(object = %object.key(), "ConfigMap observed");
                    if tx.send(object).await.is_err() {
                        debug!("Event consumer gone");
                        break;
                    }
                }
                Event::Delete(cm) => {
                    let name = cm.metadata.name.as_deref().unwrap_or_default();
                    info!(name, "ConfigMap deleted, nothing to do");
                }
                Event::Init => {
                    debug!("ConfigMap watcher initialized");
                }
                Event::InitDone => {
                    info!("ConfigMap watcher initial listing complete");
                }
            }
        }

        info!("ConfigMap watcher stopped");
    }
}

/// Snapshot the parts of a ConfigMap the reconciler reads
pub fn to_config_object(cm: &ConfigMap) -> ConfigObject {
    let metadata = &cm.metadata;
    ConfigObject {
        namespace: metadata.namespace.clone().unwrap_or_default(),
        name: metadata.name.clone().unwrap_or_default(),
        annotations: metadata.annotations.clone().unwrap_or_default(),
        data: cm.data.clone().unwrap_or_default(),
    }
}
