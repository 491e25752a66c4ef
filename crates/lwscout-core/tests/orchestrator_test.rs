// End-to-end tests for `DiscoveryOrchestrator` with a scripted discovery
// backend and a wiremock gateway.
#![allow(clippy::unwrap_used)]

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lwscout_core::{
    AggregateView, BrowseEvent, BrowseStream, CoreError, Device, DiscoveryError,
    DiscoveryOrchestrator, MemoryAssets, OrchestratorState, PermissionGate, ScoutConfig,
    ServiceBrowser,
};

// ── Scripted backend ────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedBrowser {
    senders: Mutex<Vec<mpsc::UnboundedSender<BrowseEvent>>>,
    browses: AtomicUsize,
}

impl ScriptedBrowser {
    fn emit(&self, event: BrowseEvent) {
        if let Some(tx) = self.senders.lock().unwrap().last() {
            let _ = tx.send(event);
        }
    }

    fn resolve(&self, name: &str, address: &str, port: u16) {
        let address: IpAddr = address.parse().unwrap();
        self.emit(BrowseEvent::Resolved {
            name: name.into(),
            service_type: "_lwm2m._udp.local.".into(),
            addresses: vec![address],
            port,
        });
    }

    fn remove(&self, name: &str) {
        self.emit(BrowseEvent::Removed {
            name: name.into(),
            service_type: "_lwm2m._udp.local.".into(),
        });
    }

    fn browse_count(&self) -> usize {
        self.browses.load(Ordering::SeqCst)
    }
}

impl ServiceBrowser for ScriptedBrowser {
    fn browse(&self, _service_type: &str) -> Result<BrowseStream, DiscoveryError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(tx);
        self.browses.fetch_add(1, Ordering::SeqCst);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    fn stop_browse(&self, _service_type: &str) -> Result<(), DiscoveryError> {
        Ok(())
    }
}

struct Denied(AtomicBool);

impl PermissionGate for Denied {
    fn is_granted(&self) -> bool {
        !self.0.load(Ordering::SeqCst)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn orchestrator(rest_port: u16, browser: &Arc<ScriptedBrowser>) -> DiscoveryOrchestrator {
    let config = ScoutConfig {
        rest_port,
        ..ScoutConfig::default()
    };
    DiscoveryOrchestrator::builder(config)
        .browser(Arc::clone(browser) as Arc<dyn ServiceBrowser>)
        .assets(Arc::new(MemoryAssets::new()))
        .build()
        .unwrap()
}

/// Wait until the published view satisfies `pred`.
async fn wait_for<F>(orch: &DiscoveryOrchestrator, pred: F) -> Arc<AggregateView>
where
    F: Fn(&AggregateView) -> bool,
{
    let mut views = orch.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let view = views.latest();
            if pred(&view) {
                return view;
            }
            views.changed().await.unwrap();
        }
    })
    .await
    .expect("view condition not reached in time")
}

async fn mock_clients(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_resolved_gateway_devices_reach_snapshot() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_clients(&server, json!([{ "endpoint": "dev1" }])).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();
    assert_eq!(*orch.state().borrow(), OrchestratorState::Discovering);

    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);

    let view = wait_for(&orch, |v| v.device_count() == 1).await;
    assert_eq!(view.devices, vec![Device::new("dev1", "127.0.0.1", port)]);
    assert_eq!(view.gateways.len(), 1);
    assert_eq!(view.gateways[0].port, 5683);

    orch.shutdown().await;
}

#[tokio::test]
async fn test_non_matching_service_is_ignored() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_clients(&server, json!([{ "endpoint": "dev1" }])).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();

    browser.resolve("some-printer", "127.0.0.1", 631);
    browser.resolve("WAKAAMA-LWM2M-B", "127.0.0.1", 5683);

    let view = wait_for(&orch, |v| v.device_count() == 1).await;
    assert_eq!(view.gateways.len(), 1);
    assert_eq!(view.gateways[0].name, "WAKAAMA-LWM2M-B");

    orch.shutdown().await;
}

#[tokio::test]
async fn test_lost_gateway_removes_its_devices() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_clients(&server, json!([{ "endpoint": "dev1" }, { "endpoint": "dev2" }])).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();

    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    wait_for(&orch, |v| v.device_count() == 2).await;

    browser.remove("wakaama-lwm2m-A");
    let view = wait_for(&orch, AggregateView::is_empty).await;
    assert!(view.devices.is_empty());

    orch.shutdown().await;
}

#[tokio::test]
async fn test_failed_refetch_keeps_previous_devices() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "endpoint": "dev1" }])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();

    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    wait_for(&orch, |v| v.device_count() == 1).await;

    // Re-resolution triggers a second fetch, which fails.
    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.received_requests().await.unwrap_or_default().len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(
        orch.snapshot().devices,
        vec![Device::new("dev1", "127.0.0.1", port)]
    );

    orch.shutdown().await;
}

#[tokio::test]
async fn test_events_after_stop_are_discarded() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_clients(&server, json!([{ "endpoint": "dev1" }])).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();
    orch.stop().await;
    assert_eq!(*orch.state().borrow(), OrchestratorState::Idle);

    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(orch.snapshot().is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());

    // Stopping twice is harmless.
    orch.stop().await;
    orch.shutdown().await;
}

async fn mock_slow_clients(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "endpoint": "dev1" }]))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Wait until the gateway has seen at least one device list request.
async fn wait_for_request(server: &MockServer) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.received_requests().await.unwrap_or_default().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_inflight_fetch_lands_after_stop() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_slow_clients(&server, Duration::from_millis(300)).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();
    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    wait_for_request(&server).await;

    orch.stop().await;
    assert!(orch.snapshot().devices.is_empty());

    let view = wait_for(&orch, |v| v.device_count() == 1).await;
    assert_eq!(view.devices, vec![Device::new("dev1", "127.0.0.1", port)]);
    assert!(view.gateway("wakaama-lwm2m-A").is_some());
    assert_eq!(*orch.state().borrow(), OrchestratorState::Idle);

    orch.shutdown().await;
}

#[tokio::test]
async fn test_fetch_after_shutdown_is_dropped() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_slow_clients(&server, Duration::from_millis(200)).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();
    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    wait_for_request(&server).await;

    orch.shutdown().await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let view = orch.snapshot();
    assert!(view.devices.is_empty());
    assert_eq!(view.gateways.len(), 1);
}

#[tokio::test]
async fn test_restart_keeps_state_and_rebrowses() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mock_clients(&server, json!([{ "endpoint": "dev1" }])).await;

    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(port, &browser);
    orch.start().await.unwrap();
    browser.resolve("wakaama-lwm2m-A", "127.0.0.1", 5683);
    wait_for(&orch, |v| v.device_count() == 1).await;

    orch.start().await.unwrap();

    assert_eq!(browser.browse_count(), 2);
    assert_eq!(orch.snapshot().device_count(), 1);

    orch.shutdown().await;
}

#[tokio::test]
async fn test_permission_denied_keeps_idle_and_requests_permission() {
    let browser = Arc::new(ScriptedBrowser::default());
    let gate = Arc::new(Denied(AtomicBool::new(true)));
    let orch = DiscoveryOrchestrator::builder(ScoutConfig::default())
        .browser(Arc::clone(&browser) as Arc<dyn ServiceBrowser>)
        .permission_gate(Arc::clone(&gate) as Arc<dyn PermissionGate>)
        .assets(Arc::new(MemoryAssets::new()))
        .build()
        .unwrap();
    let mut requests = orch.subscribe_permission_requests();

    let err = orch.start().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Discovery(DiscoveryError::PermissionDenied)
    ));
    assert!(requests.recv().await.is_ok());
    assert_eq!(*orch.state().borrow(), OrchestratorState::Idle);
    assert_eq!(browser.browse_count(), 0);

    // Granted later: the caller starts again.
    gate.0.store(false, Ordering::SeqCst);
    orch.start().await.unwrap();
    assert_eq!(*orch.state().borrow(), OrchestratorState::Discovering);

    orch.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_discovery_is_rearmed_periodically() {
    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(8088, &browser);
    orch.start().await.unwrap();
    assert_eq!(browser.browse_count(), 1);

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(browser.browse_count(), 3);

    // Stopping cancels the timer.
    orch.stop().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(browser.browse_count(), 3);

    orch.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_rearm_publishes_idle() {
    let browser = Arc::new(ScriptedBrowser::default());
    let gate = Arc::new(Denied(AtomicBool::new(false)));
    let orch = DiscoveryOrchestrator::builder(ScoutConfig::default())
        .browser(Arc::clone(&browser) as Arc<dyn ServiceBrowser>)
        .permission_gate(Arc::clone(&gate) as Arc<dyn PermissionGate>)
        .assets(Arc::new(MemoryAssets::new()))
        .build()
        .unwrap();
    let mut requests = orch.subscribe_permission_requests();
    let mut state = orch.state();

    orch.start().await.unwrap();
    assert_eq!(*state.borrow_and_update(), OrchestratorState::Discovering);

    // Permission revoked before the next re-arm.
    gate.0.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(35)).await;

    assert!(requests.recv().await.is_ok());
    assert_eq!(*state.borrow_and_update(), OrchestratorState::Idle);
    assert_eq!(browser.browse_count(), 1);

    // No further re-arm attempts until the caller starts again.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(requests.try_recv().is_err());

    gate.0.store(false, Ordering::SeqCst);
    orch.start().await.unwrap();
    assert_eq!(*state.borrow(), OrchestratorState::Discovering);
    assert_eq!(browser.browse_count(), 2);

    orch.shutdown().await;
}

#[tokio::test]
async fn test_start_after_shutdown_fails() {
    let browser = Arc::new(ScriptedBrowser::default());
    let orch = orchestrator(8088, &browser);
    orch.start().await.unwrap();
    orch.shutdown().await;

    assert!(matches!(orch.start().await, Err(CoreError::ShutDown)));
}
