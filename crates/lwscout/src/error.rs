//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lwscout_config::ConfigError;
use lwscout_core::{CoreError, DiscoveryError, FetchError, LoadError, NetworkError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Discovery ────────────────────────────────────────────────────

    #[error("Network discovery is not permitted")]
    #[diagnostic(
        code(lwscout::permission_denied),
        help("Allow multicast (mDNS, UDP 5353) for this process and try again.")
    )]
    DiscoveryDenied,

    #[error("Discovery failed: {reason}")]
    #[diagnostic(
        code(lwscout::discovery),
        help("Check that a network interface with multicast support is up.")
    )]
    Discovery { reason: String },

    // ── Gateway access ───────────────────────────────────────────────

    #[error("Could not connect to gateway: {reason}")]
    #[diagnostic(
        code(lwscout::connection_failed),
        help(
            "Check that the gateway is reachable and its REST bridge is listening.\n\
             The bridge port is set with --rest-port (default 8088)."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Gateway request timed out: {reason}")]
    #[diagnostic(
        code(lwscout::timeout),
        help("Increase the timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout { reason: String },

    #[error("Gateway returned HTTP {status}")]
    #[diagnostic(code(lwscout::gateway_status))]
    GatewayStatus { status: u16 },

    #[error("Malformed gateway response: {message}")]
    #[diagnostic(code(lwscout::decode))]
    Decode { message: String },

    // ── Object schemas ───────────────────────────────────────────────

    #[error("No object model for object {object_id}")]
    #[diagnostic(
        code(lwscout::no_object_model),
        help("Expected models/{object_id}.xml or models/{object_id}-1_0.xml below the --models directory.")
    )]
    NoObjectModel { object_id: u16 },

    #[error("Object {object_id} defines no resource {resource_id}")]
    #[diagnostic(
        code(lwscout::not_found),
        help("Run: lwscout resources {object_id} to see available resources")
    )]
    UnknownResource { object_id: u16, resource_id: u16 },

    #[error("Resource {resource} does not allow {operation} (operations: '{operations}')")]
    #[diagnostic(
        code(lwscout::operation_not_allowed),
        help("Drop --strict to send the request anyway.")
    )]
    OperationNotAllowed {
        resource: String,
        operation: String,
        operations: String,
    },

    #[error("Malformed object model: {reason}")]
    #[diagnostic(code(lwscout::object_model))]
    ObjectModel { reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lwscout::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(lwscout::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(lwscout::config))]
    Config(Box<figment::Error>),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(lwscout::config))]
    ConfigSerialize(String),

    #[error("Orchestrator has been shut down")]
    #[diagnostic(code(lwscout::shut_down))]
    ShutDown,

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoObjectModel { .. }
            | Self::UnknownResource { .. }
            | Self::GatewayStatus { status: 404 } => exit_code::NOT_FOUND,
            Self::DiscoveryDenied | Self::OperationNotAllowed { .. } => exit_code::PERMISSION,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Core errors → CliError ───────────────────────────────────────────

impl From<NetworkError> for CliError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Timeout(reason) => Self::Timeout { reason },
            NetworkError::Connect(reason) | NetworkError::Io(reason) => {
                Self::ConnectionFailed { reason }
            }
            NetworkError::InvalidAddress(reason) => Self::Validation {
                field: "host".into(),
                reason,
            },
        }
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(e) => e.into(),
            FetchError::Status(status) => Self::GatewayStatus { status },
            FetchError::Decode(message) => Self::Decode { message },
        }
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound { object_id } => Self::NoObjectModel { object_id },
            other @ (LoadError::Parse { .. } | LoadError::Io { .. }) => Self::ObjectModel {
                reason: other.to_string(),
            },
        }
    }
}

impl From<DiscoveryError> for CliError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::PermissionDenied => Self::DiscoveryDenied,
            other => Self::Discovery {
                reason: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Discovery(e) => e.into(),
            CoreError::Fetch(e) => e.into(),
            CoreError::Network(e) => e.into(),
            CoreError::Load(e) => e.into(),
            CoreError::ShutDown => Self::ShutDown,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Serialization(e) => Self::ConfigSerialize(e.to_string()),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}
