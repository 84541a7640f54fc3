//! Bootstrap ordering, home-page isolation and shutdown of the orchestrator

mod common;

use std::{sync::Arc, time::Duration};

use common::{Call, RecordingApi};
use futures::stream;
use grafsync_client::{GrafanaApi, ReadinessPolicy, RetryPolicy};
use grafsync_core::{
    BootstrapSettings, ConfigObject, ContentDedupStore, FolderResolver, Orchestrator,
    ShutdownSignal,
};

const DASHBOARD: &str = r#"{"dashboard":{"title":"Overview"}}"#;

fn settings(home_page: Option<&str>) -> BootstrapSettings {
    BootstrapSettings {
        home_page: home_page.map(str::to_string),
        readiness: ReadinessPolicy {
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(30),
        },
        home_page_retry: RetryPolicy::default(),
    }
}

fn orchestrator(api: Arc<RecordingApi>, folders: &str, home_page: Option<&str>) -> Orchestrator {
    let dyn_api: Arc<dyn GrafanaApi> = api;
    Orchestrator::new(
        dyn_api,
        Arc::new(FolderResolver::from_csv(folders)),
        Arc::new(ContentDedupStore::new()),
        settings(home_page),
    )
}

fn ops_dashboard(name: &str) -> ConfigObject {
    ConfigObject::new("monitoring", name)
        .with_annotation("grafana.net/dashboards", "true")
        .with_annotation("grafana.net/folder", "ops")
        .with_entry("a.json", DASHBOARD)
}

#[tokio::test]
async fn test_folder_sync_completes_before_first_event() {
    let api = Arc::new(RecordingApi::with_folders(&[(7, "ops")]));
    let orch = orchestrator(api.clone(), "ops", None);

    let summary = orch
        .run(
            stream::iter(vec![ops_dashboard("dash")]),
            ShutdownSignal::new(),
        )
        .await;

    assert_eq!(summary.processed, 1);
    let calls = api.calls();
    let listed = calls.iter().position(|c| *c == Call::ListFolders).unwrap();
    let created = calls
        .iter()
        .position(|c| matches!(c, Call::CreateDashboard(_)))
        .unwrap();
    assert!(listed < created);
    assert_eq!(calls[1], Call::CreateFolder("ops".to_string()));
    assert_eq!(api.dashboards()[0]["folderId"], 7);
}

#[tokio::test(start_paused = true)]
async fn test_unready_grafana_does_not_stop_consumption() {
    let api = Arc::new(RecordingApi {
        unhealthy: true,
        ..Default::default()
    });
    let orch = orchestrator(api.clone(), "ops", None);

    let summary = orch
        .run(
            stream::iter(vec![ops_dashboard("dash")]),
            ShutdownSignal::new(),
        )
        .await;

    assert_eq!(summary.processed, 1);
    let calls = api.calls();
    assert!(!calls.contains(&Call::ListFolders));
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateFolder(_))));
    // folder unknown: root
    assert_eq!(api.dashboards()[0]["folderId"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_home_page_set_alongside_consumption() {
    let api = Arc::new(RecordingApi {
        home_dashboard_id: Some(42),
        ..RecordingApi::with_folders(&[(7, "ops")])
    });
    let orch = orchestrator(api.clone(), "ops", Some("ji-qun-zong-lan"));

    let summary = orch
        .run(
            stream::iter(vec![ops_dashboard("dash")]),
            ShutdownSignal::new(),
        )
        .await;
    summary.home_page.unwrap().await.unwrap();

    assert_eq!(summary.processed, 1);
    let calls = api.calls();
    assert!(calls.contains(&Call::DashboardBySlug("ji-qun-zong-lan".to_string())));
    let star = calls.iter().position(|c| *c == Call::Star(42)).unwrap();
    let home = calls
        .iter()
        .position(|c| *c == Call::HomeDashboard(42))
        .unwrap();
    assert!(star < home);
}

#[tokio::test(start_paused = true)]
async fn test_home_page_outlives_event_loop() {
    let api = Arc::new(RecordingApi {
        home_dashboard_id: Some(42),
        ..RecordingApi::with_folders(&[(7, "ops")])
    });
    let orch = orchestrator(api.clone(), "ops", Some("home"));

    let summary = orch
        .run(
            stream::iter(vec![ops_dashboard("dash")]),
            ShutdownSignal::new(),
        )
        .await;
    // the event loop is done well before the first 6s slug delay
    assert!(!api.calls().contains(&Call::Star(42)));
    drop(summary);

    tokio::time::sleep(Duration::from_secs(120)).await;

    let calls = api.calls();
    assert!(calls.contains(&Call::Star(42)));
    assert!(calls.contains(&Call::HomeDashboard(42)));
}

#[tokio::test(start_paused = true)]
async fn test_home_page_failure_is_isolated() {
    let api = Arc::new(RecordingApi::with_folders(&[(7, "ops")]));
    let orch = orchestrator(api.clone(), "ops", Some("missing"));

    let summary = orch
        .run(
            stream::iter(vec![ops_dashboard("dash")]),
            ShutdownSignal::new(),
        )
        .await;
    summary.home_page.unwrap().await.unwrap();

    // the reconcile path is unaffected
    assert_eq!(summary.processed, 1);
    assert_eq!(api.dashboards()[0]["folderId"], 7);

    let calls = api.calls();
    let lookups = calls
        .iter()
        .filter(|c| matches!(c, Call::DashboardBySlug(_)))
        .count();
    assert_eq!(lookups, 10);
    assert!(!calls.iter().any(|c| matches!(c, Call::Star(_) | Call::HomeDashboard(_))));
}

#[tokio::test]
async fn test_no_home_page_task_without_slug() {
    let api = Arc::new(RecordingApi::with_folders(&[(7, "ops")]));
    let orch = orchestrator(api.clone(), "ops", None);

    let summary = orch.run(stream::iter(Vec::<ConfigObject>::new()), ShutdownSignal::new()).await;

    assert!(summary.home_page.is_none());
    assert_eq!(summary.processed, 0);
}

#[tokio::test]
async fn test_shutdown_stops_pending_stream() {
    let api = Arc::new(RecordingApi::default());
    let orch = Arc::new(orchestrator(api, "", None));
    let shutdown = ShutdownSignal::new();

    let run = {
        let orch = orch.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            orch.run(stream::pending::<ConfigObject>(), shutdown).await.processed
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown.shutdown();

    let processed = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(processed, 0);
}

#[tokio::test]
async fn test_shutdown_before_start_skips_bootstrap() {
    let api = Arc::new(RecordingApi::default());
    let orch = orchestrator(api.clone(), "ops", Some("home"));
    let shutdown = ShutdownSignal::new();
    shutdown.shutdown();

    let summary = orch
        .run(stream::iter(vec![ops_dashboard("dash")]), shutdown)
        .await;

    assert_eq!(summary.processed, 0);
    assert!(summary.home_page.is_none());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_redelivered_burst_creates_once() {
    let api = Arc::new(RecordingApi::with_folders(&[(7, "ops")]));
    let orch = orchestrator(api.clone(), "ops", None);
    let burst = vec![
        ops_dashboard("dash"),
        ops_dashboard("dash"),
        ops_dashboard("dash-copy"),
    ];

    let summary = orch.run(stream::iter(burst), ShutdownSignal::new()).await;

    assert_eq!(summary.processed, 3);
    assert_eq!(api.create_count(), 1);
}
