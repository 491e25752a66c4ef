// ── Discovery orchestrator ──
//
// Lifecycle management for gateway discovery. Resolver events and fetch
// results all funnel into one owner task through a mailbox; that task
// holds the only `AggregationStore`, so store mutations never race.
// Readers get immutable snapshots through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::discovery::{
    AlwaysGranted, GatewayEvent, GatewayEventStream, GatewayResolver, MdnsBrowser, PermissionGate,
    PermissionRequest, ServiceBrowser,
};
use crate::error::{CoreError, FetchError, LoadError, NetworkError};
use crate::fetch::DeviceFetcher;
use crate::model::{
    AggregateView, Device, Gateway, ObjectInstance, ResourceCoordinate, ResourceDefinition,
};
use crate::object_model::{AssetSource, DirAssets, ObjectModelLoader};
use crate::resource::{ResourceClient, ResourceResponse};
use crate::store::{AggregationStore, Generation};
use crate::stream::ViewStream;

const MAILBOX_SIZE: usize = 256;

// ── OrchestratorState ────────────────────────────────────────────

/// Discovery state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OrchestratorState {
    Idle,
    Discovering,
}

// ── Owner mailbox ────────────────────────────────────────────────

#[derive(Debug)]
enum StoreCommand {
    Resolved(Gateway),
    Lost(String),
    FetchCompleted {
        name: String,
        generation: Generation,
        result: Result<Vec<Device>, FetchError>,
    },
}

struct DiscoveryRun {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

// ── DiscoveryOrchestrator ────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<OrchestratorInner>`. Runs discovery,
/// fans out device fetches per resolved gateway, and exposes the
/// aggregate view plus resource access.
#[derive(Clone)]
pub struct DiscoveryOrchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    config: ScoutConfig,
    resolver: Arc<GatewayResolver>,
    fetcher: DeviceFetcher,
    resources: ResourceClient,
    models: ObjectModelLoader,
    state: Arc<watch::Sender<OrchestratorState>>,
    view: watch::Receiver<Arc<AggregateView>>,
    mailbox: mpsc::Sender<StoreCommand>,
    owner: Mutex<Option<(AggregationStore, mpsc::Receiver<StoreCommand>)>>,
    discovery: Mutex<Option<DiscoveryRun>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl DiscoveryOrchestrator {
    /// Create an orchestrator with the mDNS backend and on-disk models.
    /// Does NOT start discovery -- call [`start()`](Self::start).
    pub fn new(config: ScoutConfig) -> Result<Self, CoreError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ScoutConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start (or restart) discovery.
    ///
    /// On a discovery error the orchestrator stays `Idle`. A denied
    /// permission additionally emits a [`PermissionRequest`].
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ShutDown);
        }
        self.ensure_owner().await;

        let mut discovery = self.inner.discovery.lock().await;
        if let Some(run) = discovery.take() {
            run.cancel.cancel();
            let _ = run.handle.await;
        }

        let events = match self.inner.resolver.start_discovery() {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "discovery not started");
                self.inner.state.send_replace(OrchestratorState::Idle);
                return Err(e.into());
            }
        };

        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(discovery_task(
            Arc::clone(&self.inner.resolver),
            self.inner.mailbox.clone(),
            events,
            Arc::clone(&self.inner.state),
            self.inner.config.rediscover_interval,
            cancel.clone(),
        ));
        *discovery = Some(DiscoveryRun { cancel, handle });

        self.inner.state.send_replace(OrchestratorState::Discovering);
        info!("discovery started");
        Ok(())
    }

    /// Stop discovery and the re-arm timer.
    ///
    /// Known gateways and devices are kept, and fetches already in
    /// flight still land in the store.
    pub async fn stop(&self) {
        let run = self.inner.discovery.lock().await.take();
        if let Some(run) = run {
            run.cancel.cancel();
            let _ = run.handle.await;
        }
        if let Err(e) = self.inner.resolver.stop_discovery() {
            warn!(error = %e, "stopping discovery failed");
        }
        self.inner.state.send_replace(OrchestratorState::Idle);
        debug!("discovery stopped");
    }

    /// Stop discovery and tear down the store owner.
    ///
    /// Fetch results that arrive afterwards are discarded.
    pub async fn shutdown(&self) {
        self.stop().await;
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("orchestrator shut down");
    }

    async fn ensure_owner(&self) {
        let Some((store, rx)) = self.inner.owner.lock().await.take() else {
            return;
        };
        let handle = tokio::spawn(owner_task(
            store,
            rx,
            self.inner.fetcher.clone(),
            self.inner.mailbox.clone(),
            self.inner.cancel.clone(),
        ));
        self.inner.task_handles.lock().await.push(handle);
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to discovery state changes.
    pub fn state(&self) -> watch::Receiver<OrchestratorState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to permission requests raised when discovery is refused.
    pub fn subscribe_permission_requests(&self) -> broadcast::Receiver<PermissionRequest> {
        self.inner.resolver.subscribe_permission_requests()
    }

    /// The current aggregate view.
    pub fn snapshot(&self) -> Arc<AggregateView> {
        self.inner.view.borrow().clone()
    }

    /// Subscribe to aggregate view changes.
    pub fn subscribe(&self) -> ViewStream {
        ViewStream::new(self.inner.view.clone())
    }

    // ── Device access (delegates) ────────────────────────────────

    pub async fn fetch_object_links(&self, device: &Device) -> Result<Vec<ObjectInstance>, FetchError> {
        self.inner.fetcher.fetch_object_links(device).await
    }

    pub fn load_resource_definitions(&self, object_id: u16) -> Result<Vec<ResourceDefinition>, LoadError> {
        self.inner.models.load_resource_definitions(object_id)
    }

    pub async fn read_resource(&self, coordinate: &ResourceCoordinate) -> Result<ResourceResponse, NetworkError> {
        self.inner.resources.read_resource(coordinate).await
    }

    pub async fn write_resource(
        &self,
        coordinate: &ResourceCoordinate,
        value: &str,
    ) -> Result<ResourceResponse, NetworkError> {
        self.inner.resources.write_resource(coordinate, value).await
    }
}

// ── Builder ──────────────────────────────────────────────────────

/// Swaps out the discovery backend, permission gate, asset store or
/// HTTP client of a [`DiscoveryOrchestrator`].
pub struct OrchestratorBuilder {
    config: ScoutConfig,
    browser: Option<Arc<dyn ServiceBrowser>>,
    permission: Arc<dyn PermissionGate>,
    assets: Option<Arc<dyn AssetSource>>,
    http: Option<reqwest::Client>,
}

impl OrchestratorBuilder {
    fn new(config: ScoutConfig) -> Self {
        Self {
            config,
            browser: None,
            permission: Arc::new(AlwaysGranted),
            assets: None,
            http: None,
        }
    }

    pub fn browser(mut self, browser: Arc<dyn ServiceBrowser>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn permission_gate(mut self, gate: Arc<dyn PermissionGate>) -> Self {
        self.permission = gate;
        self
    }

    pub fn assets(mut self, assets: Arc<dyn AssetSource>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<DiscoveryOrchestrator, CoreError> {
        let config = self.config;

        let browser: Arc<dyn ServiceBrowser> = match self.browser {
            Some(browser) => browser,
            None => Arc::new(MdnsBrowser::new()?),
        };
        let http = match self.http {
            Some(http) => http,
            None => config.transport().build_client()?,
        };
        let assets: Arc<dyn AssetSource> = match self.assets {
            Some(assets) => assets,
            None => Arc::new(DirAssets::new(config.model_dir.clone())),
        };

        let store = AggregationStore::new();
        let view = store.view_receiver();
        let (mailbox, rx) = mpsc::channel(MAILBOX_SIZE);
        let (state, _) = watch::channel(OrchestratorState::Idle);

        Ok(DiscoveryOrchestrator {
            inner: Arc::new(OrchestratorInner {
                resolver: Arc::new(GatewayResolver::new(&config, browser, self.permission)),
                fetcher: DeviceFetcher::with_client(http.clone(), config.rest_port),
                resources: ResourceClient::with_client(http),
                models: ObjectModelLoader::new(assets),
                state: Arc::new(state),
                view,
                mailbox,
                owner: Mutex::new(Some((store, rx))),
                discovery: Mutex::new(None),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
                config,
            }),
        })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Sole owner of the store. Applies mailbox commands one at a time.
async fn owner_task(
    mut store: AggregationStore,
    mut rx: mpsc::Receiver<StoreCommand>,
    fetcher: DeviceFetcher,
    mailbox: mpsc::Sender<StoreCommand>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            command = rx.recv() => {
                let Some(command) = command else { break };
                apply(&mut store, command, &fetcher, &mailbox);
            }
        }
    }
    debug!("store owner stopped");
}

fn apply(
    store: &mut AggregationStore,
    command: StoreCommand,
    fetcher: &DeviceFetcher,
    mailbox: &mpsc::Sender<StoreCommand>,
) {
    match command {
        StoreCommand::Resolved(gateway) => {
            let name = gateway.name.clone();
            let generation = store.update_gateway(&name, gateway.clone());
            info!(gateway = %gateway, "gateway resolved");
            spawn_fetch(fetcher.clone(), mailbox.clone(), gateway, generation);
        }
        StoreCommand::Lost(name) => {
            if store.remove_gateway(&name) {
                info!(gateway = %name, "gateway lost");
            }
        }
        StoreCommand::FetchCompleted {
            name,
            generation,
            result,
        } => match result {
            Ok(devices) => {
                let count = devices.len();
                if store.set_devices_at(&name, generation, devices) {
                    debug!(gateway = %name, devices = count, "device list updated");
                }
            }
            Err(e) => warn!(gateway = %name, error = %e, "device fetch failed, keeping previous devices"),
        },
    }
}

/// One detached fetch per resolution. Never cancelled; if the owner is
/// gone by the time it finishes, the result is dropped.
fn spawn_fetch(
    fetcher: DeviceFetcher,
    mailbox: mpsc::Sender<StoreCommand>,
    gateway: Gateway,
    generation: Generation,
) {
    tokio::spawn(async move {
        let result = fetcher.fetch_devices(&gateway).await;
        let completed = StoreCommand::FetchCompleted {
            name: gateway.name,
            generation,
            result,
        };
        if mailbox.send(completed).await.is_err() {
            debug!("fetch finished after shutdown, result dropped");
        }
    });
}

/// Pump resolver events into the mailbox and re-arm the resolver on a
/// fixed interval.
///
/// A failed re-arm ends the run and publishes `Idle`; the caller has to
/// `start()` again.
async fn discovery_task(
    resolver: Arc<GatewayResolver>,
    mailbox: mpsc::Sender<StoreCommand>,
    events: GatewayEventStream,
    state: Arc<watch::Sender<OrchestratorState>>,
    rearm_every: Duration,
    cancel: CancellationToken,
) {
    let mut events = Some(events);
    let mut rearm = rearm_interval(rearm_every).await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = next_tick(&mut rearm) => {
                debug!("re-arming discovery");
                match resolver.start_discovery() {
                    Ok(fresh) => events = Some(fresh),
                    Err(e) => {
                        warn!(error = %e, "re-arming discovery failed");
                        state.send_replace(OrchestratorState::Idle);
                        break;
                    }
                }
            }
            event = next_event(&mut events) => match event {
                Some(event) => {
                    if forward(&mailbox, event).await.is_err() {
                        break;
                    }
                }
                None => {
                    debug!("discovery session ended");
                    events = None;
                }
            },
        }
    }
}

async fn forward(
    mailbox: &mpsc::Sender<StoreCommand>,
    event: GatewayEvent,
) -> Result<(), mpsc::error::SendError<StoreCommand>> {
    match event {
        GatewayEvent::Found { name, .. } => {
            debug!(service = %name, "gateway found");
            Ok(())
        }
        GatewayEvent::Resolved(gateway) => mailbox.send(StoreCommand::Resolved(gateway)).await,
        GatewayEvent::Lost { name } => mailbox.send(StoreCommand::Lost(name)).await,
    }
}

/// `None` when re-arming is disabled. The immediate first tick is consumed.
async fn rearm_interval(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;
    Some(interval)
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_event(events: &mut Option<GatewayEventStream>) -> Option<GatewayEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}
