// lwscout-core: Discovery and aggregation engine between lwscout-api and consumers (CLI).

pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod model;
pub mod object_model;
pub mod orchestrator;
pub mod resource;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ScoutConfig;
pub use discovery::{
    AlwaysGranted, BrowseEvent, BrowseStream, GatewayEvent, GatewayEventStream, GatewayResolver,
    MdnsBrowser, PermissionGate, PermissionRequest, ServiceBrowser,
};
pub use error::{CoreError, DiscoveryError, FetchError, LoadError, NetworkError};
pub use fetch::DeviceFetcher;
pub use object_model::{AssetSource, DirAssets, MemoryAssets, ObjectModelLoader};
pub use orchestrator::{DiscoveryOrchestrator, OrchestratorBuilder, OrchestratorState};
pub use resource::{ResourceClient, ResourceResponse};
pub use store::{AggregationStore, Generation};
pub use stream::ViewStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AggregateView, Device, Gateway, ObjectInstance, Operations, ResourceCoordinate,
    ResourceDefinition,
};
