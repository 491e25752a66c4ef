// ── Gateway discovery ──
//
// A `ServiceBrowser` backend produces raw `BrowseEvent`s; the
// `GatewayResolver` filters them and turns them into typed
// `GatewayEvent`s for exactly one discovery session at a time.

mod mdns;
mod resolver;

use std::net::IpAddr;

use futures_util::stream::BoxStream;

use crate::error::DiscoveryError;
use crate::model::Gateway;

pub use mdns::MdnsBrowser;
pub use resolver::{GatewayEventStream, GatewayResolver};

/// Raw service event stream from a discovery backend.
pub type BrowseStream = BoxStream<'static, BrowseEvent>;

/// Unfiltered event from a discovery backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseEvent {
    /// A service record was seen; not yet resolved.
    Found { name: String, service_type: String },
    /// A service record resolved to addresses and a port.
    Resolved {
        name: String,
        service_type: String,
        addresses: Vec<IpAddr>,
        port: u16,
    },
    /// The backend gave up resolving a record.
    ResolveFailed { name: String, reason: String },
    /// A previously seen service went away.
    Removed { name: String, service_type: String },
}

/// Typed gateway event emitted by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Found { name: String, service_type: String },
    Resolved(Gateway),
    Lost { name: String },
}

/// A multicast service discovery backend.
pub trait ServiceBrowser: Send + Sync + 'static {
    /// Start browsing `service_type` (e.g. `_lwm2m._udp.`).
    fn browse(&self, service_type: &str) -> Result<BrowseStream, DiscoveryError>;

    /// Stop browsing `service_type`. The stream returned by `browse`
    /// may keep yielding events already in flight.
    fn stop_browse(&self, service_type: &str) -> Result<(), DiscoveryError>;
}

// ── Permissions ─────────────────────────────────────────────────────

/// Name of the runtime permission multicast discovery needs.
pub const NETWORK_DISCOVERY_PERMISSION: &str = "network-discovery";

/// Decides whether discovery may run right now.
pub trait PermissionGate: Send + Sync + 'static {
    fn is_granted(&self) -> bool;
}

/// Gate for platforms without a runtime permission model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn is_granted(&self) -> bool {
        true
    }
}

/// Emitted when discovery was refused for lack of permission. The
/// caller should obtain it and start discovery again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub permission: &'static str,
}
