// ── Core error types ──
//
// One enum per failure domain, plus the `CoreError` umbrella consumers
// match on. Transport errors from lwscout-api are translated here and
// never reach callers raw.

use std::error::Error as StdError;

use thiserror::Error;

/// Multicast discovery could not start, stop, or run.
///
/// Always recovered where it happens: discovery simply does not proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("Network discovery permission not granted")]
    PermissionDenied,

    #[error("Failed to start discovery: {0}")]
    StartFailed(String),

    #[error("Failed to stop discovery: {0}")]
    StopFailed(String),

    #[error("Discovery backend error: {0}")]
    Backend(String),
}

/// Transport-level failure talking to a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Invalid gateway address: {0}")]
    InvalidAddress(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// A device-list or object-link fetch failed. Prior device state is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Gateway returned HTTP {0}")]
    Status(u16),

    #[error("Malformed gateway response: {0}")]
    Decode(String),
}

/// An object schema could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No object model for object {object_id}")]
    NotFound { object_id: u16 },

    #[error("Malformed object model {asset}: {reason}")]
    Parse { asset: String, reason: String },

    #[error("Cannot read {asset}: {source}")]
    Io {
        asset: String,
        #[source]
        source: std::io::Error,
    },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Orchestrator has been shut down")]
    ShutDown,
}

// ── Conversion from transport-layer errors ───────────────────────────

/// Render an error and its source chain as `outer: inner: root`.
///
/// reqwest keeps the interesting part (e.g. "Connection refused") in the
/// source chain, not in the top-level message.
pub(crate) fn cause_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !text.contains(&msg) {
            text.push_str(": ");
            text.push_str(&msg);
        }
        source = cause.source();
    }
    text
}

impl From<lwscout_api::Error> for NetworkError {
    fn from(err: lwscout_api::Error) -> Self {
        match err {
            lwscout_api::Error::Transport(ref e) => {
                let cause = cause_chain(e);
                if e.is_timeout() {
                    NetworkError::Timeout(cause)
                } else if e.is_connect() {
                    NetworkError::Connect(cause)
                } else {
                    NetworkError::Io(cause)
                }
            }
            lwscout_api::Error::InvalidUrl(e) => NetworkError::InvalidAddress(e.to_string()),
            other => NetworkError::Io(other.to_string()),
        }
    }
}

impl From<lwscout_api::Error> for FetchError {
    fn from(err: lwscout_api::Error) -> Self {
        match err {
            lwscout_api::Error::Status { status } => FetchError::Status(status),
            lwscout_api::Error::Deserialization { message, body: _ } => FetchError::Decode(message),
            other => FetchError::Network(other.into()),
        }
    }
}

impl From<lwscout_api::Error> for CoreError {
    fn from(err: lwscout_api::Error) -> Self {
        match err {
            lwscout_api::Error::Status { .. } | lwscout_api::Error::Deserialization { .. } => {
                CoreError::Fetch(err.into())
            }
            other => CoreError::Network(other.into()),
        }
    }
}
