// ── Runtime configuration ──
//
// Describes *how* to discover and talk to gateways. Does not load
// from disk -- that's the config crate's job.

use std::path::PathBuf;
use std::time::Duration;

use lwscout_api::TransportConfig;

pub use lwscout_api::DEFAULT_REST_PORT;

/// Service type browsed for gateways.
pub const DEFAULT_SERVICE_TYPE: &str = "_lwm2m._udp.";
/// Fragment every gateway service name must contain (case-insensitive).
pub const DEFAULT_NAME_FILTER: &str = "wakaama-lwm2m";
/// Interval at which an active discovery is re-armed.
pub const DEFAULT_REDISCOVER_INTERVAL: Duration = Duration::from_secs(30);

/// Runtime knobs for discovery, fetching and resource access.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// mDNS service type to browse, without the `local.` domain.
    pub service_type: String,
    /// Case-insensitive substring a service name must contain.
    pub name_filter: String,
    /// Port of the gateway REST bridge. The mDNS-advertised port is the
    /// CoAP listener and is never used for HTTP.
    pub rest_port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Re-arm interval for the resolver. Zero disables re-arming.
    pub rediscover_interval: Duration,
    /// Asset root holding `models/{id}.xml` object schemas.
    pub model_dir: PathBuf,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            service_type: DEFAULT_SERVICE_TYPE.into(),
            name_filter: DEFAULT_NAME_FILTER.into(),
            rest_port: DEFAULT_REST_PORT,
            connect_timeout: transport.connect_timeout,
            read_timeout: transport.read_timeout,
            rediscover_interval: DEFAULT_REDISCOVER_INTERVAL,
            model_dir: PathBuf::from("."),
        }
    }
}

impl ScoutConfig {
    /// HTTP transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
        }
    }
}
