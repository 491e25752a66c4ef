// Shared transport configuration for building reqwest::Client instances.
//
// Gateways speak plain HTTP on the local network, so the only tuning
// knobs are the two timeouts and the user agent.

use std::time::Duration;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Time allowed to establish the TCP connection.
    pub connect_timeout: Duration,
    /// Time allowed between reads once connected.
    pub read_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .user_agent(concat!("lwscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
