// ── Gateway resolver ──
//
// Owns the single active discovery session. Each session is tied to a
// cancellation token: stopping (or restarting) cancels it, and the
// session's event stream yields nothing further once cancelled, even
// if the backend still has events queued.

use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    BrowseEvent, BrowseStream, GatewayEvent, NETWORK_DISCOVERY_PERMISSION, PermissionGate,
    PermissionRequest, ServiceBrowser,
};
use crate::config::ScoutConfig;
use crate::error::DiscoveryError;
use crate::model::Gateway;

const PERMISSION_CHANNEL_SIZE: usize = 8;

// ── ServiceFilter ────────────────────────────────────────────────

/// Service type and name constraints every gateway record must meet.
#[derive(Debug, Clone)]
struct ServiceFilter {
    service_type: String,
    name_fragment: String,
}

impl ServiceFilter {
    fn new(service_type: &str, name_fragment: &str) -> Self {
        Self {
            service_type: normalize_service_type(service_type),
            name_fragment: name_fragment.to_lowercase(),
        }
    }

    fn matches(&self, name: &str, service_type: &str) -> bool {
        normalize_service_type(service_type) == self.service_type
            && name.to_lowercase().contains(&self.name_fragment)
    }

    /// Filter and type one raw event. `None` means "drop it".
    fn apply(&self, event: BrowseEvent) -> Option<GatewayEvent> {
        match event {
            BrowseEvent::Found { name, service_type } => self
                .matches(&name, &service_type)
                .then_some(GatewayEvent::Found { name, service_type }),
            BrowseEvent::Resolved {
                name,
                service_type,
                addresses,
                port,
            } => {
                if !self.matches(&name, &service_type) {
                    return None;
                }
                let Some(address) = preferred_address(&addresses) else {
                    warn!(service = %name, "resolve failed: no address");
                    return None;
                };
                Some(GatewayEvent::Resolved(Gateway::new(
                    name,
                    address.to_string(),
                    port,
                )))
            }
            BrowseEvent::ResolveFailed { name, reason } => {
                if name.to_lowercase().contains(&self.name_fragment) {
                    warn!(service = %name, %reason, "resolve failed");
                }
                None
            }
            BrowseEvent::Removed { name, service_type } => self
                .matches(&name, &service_type)
                .then_some(GatewayEvent::Lost { name }),
        }
    }
}

/// `_lwm2m._udp.local.`, `_LWM2M._udp` and `_lwm2m._udp.` all compare equal.
fn normalize_service_type(service_type: &str) -> String {
    let lower = service_type.to_lowercase();
    let trimmed = lower.trim_end_matches('.');
    let bare = trimmed.strip_suffix(".local").unwrap_or(trimmed);
    format!("{bare}.")
}

/// First IPv4 address if any, otherwise the first address at all.
fn preferred_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    addresses
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
}

// ── GatewayEventStream ───────────────────────────────────────────

/// Filtered events of one discovery session.
///
/// Ends (returns `None`) when the session is stopped or the backend
/// stream closes.
pub struct GatewayEventStream {
    inner: BrowseStream,
    filter: Arc<ServiceFilter>,
    cancel: CancellationToken,
}

impl GatewayEventStream {
    /// Wait for the next gateway event of this session.
    pub async fn recv(&mut self) -> Option<GatewayEvent> {
        loop {
            let raw = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return None,
                raw = self.inner.next() => raw?,
            };
            // A stop racing with this poll must still win.
            if self.cancel.is_cancelled() {
                return None;
            }
            if let Some(event) = self.filter.apply(raw) {
                return Some(event);
            }
        }
    }

    /// Whether the owning session is still running.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

// ── GatewayResolver ──────────────────────────────────────────────

/// Drives a [`ServiceBrowser`] with at most one active session.
pub struct GatewayResolver {
    browser: Arc<dyn ServiceBrowser>,
    permission: Arc<dyn PermissionGate>,
    filter: Arc<ServiceFilter>,
    session: Mutex<Option<CancellationToken>>,
    permission_tx: broadcast::Sender<PermissionRequest>,
}

impl GatewayResolver {
    pub fn new(
        config: &ScoutConfig,
        browser: Arc<dyn ServiceBrowser>,
        permission: Arc<dyn PermissionGate>,
    ) -> Self {
        let (permission_tx, _) = broadcast::channel(PERMISSION_CHANNEL_SIZE);
        Self {
            browser,
            permission,
            filter: Arc::new(ServiceFilter::new(&config.service_type, &config.name_filter)),
            session: Mutex::new(None),
            permission_tx,
        }
    }

    /// Start a discovery session, stopping any running one first.
    ///
    /// Without permission this emits a [`PermissionRequest`] and returns
    /// `DiscoveryError::PermissionDenied`; call again once granted.
    pub fn start_discovery(&self) -> Result<GatewayEventStream, DiscoveryError> {
        let mut session = self.lock_session();

        if let Err(e) = self.stop_session(&mut session) {
            warn!(error = %e, "stopping previous discovery session failed");
        }

        if !self.permission.is_granted() {
            warn!("network discovery permission not granted");
            let _ = self.permission_tx.send(PermissionRequest {
                permission: NETWORK_DISCOVERY_PERMISSION,
            });
            return Err(DiscoveryError::PermissionDenied);
        }

        let inner = self.browser.browse(&self.filter.service_type)?;
        let cancel = CancellationToken::new();
        *session = Some(cancel.clone());

        info!(service_type = %self.filter.service_type, "discovery started");
        Ok(GatewayEventStream {
            inner,
            filter: Arc::clone(&self.filter),
            cancel,
        })
    }

    /// Stop the running session. A no-op if none is running.
    pub fn stop_discovery(&self) -> Result<(), DiscoveryError> {
        let mut session = self.lock_session();
        self.stop_session(&mut session)
    }

    pub fn is_active(&self) -> bool {
        self.lock_session().is_some()
    }

    /// Subscribe to permission requests raised by `start_discovery`.
    pub fn subscribe_permission_requests(&self) -> broadcast::Receiver<PermissionRequest> {
        self.permission_tx.subscribe()
    }

    fn stop_session(&self, session: &mut Option<CancellationToken>) -> Result<(), DiscoveryError> {
        let Some(cancel) = session.take() else {
            return Ok(());
        };
        cancel.cancel();
        self.browser.stop_browse(&self.filter.service_type)?;
        debug!("discovery stopped");
        Ok(())
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
