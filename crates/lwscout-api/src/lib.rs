// lwscout-api: Async Rust client for the LwM2M gateway REST bridge.
//
// One `GatewayClient` talks to one gateway's REST listener. Endpoint
// groups (client listing, resource access) live in their own modules
// as inherent methods on the client.

pub mod client;
pub mod clients;
pub mod error;
pub mod host;
pub mod models;
pub mod resources;
pub mod transport;

pub use client::GatewayClient;
pub use clients::parse_client_list;
pub use error::Error;
pub use host::{base_url, format_host};
pub use models::{ClientDetail, ObjectLinkEntry, RawResponse, RegisteredClient};
pub use transport::TransportConfig;

/// Well-known port of the gateway REST listener.
pub const DEFAULT_REST_PORT: u16 = 8088;
