// ── Domain model ──
//
// Value types exchanged between the resolver, fetcher, store and
// consumers. Everything here is immutable data passed by copy; only the
// aggregation store owns mutable state.

pub mod gateway;
pub mod resource;
pub mod view;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use lwscout_core::model::*` gives you everything.

pub use gateway::{Device, Gateway};
pub use resource::{ObjectInstance, Operations, ResourceCoordinate, ResourceDefinition};
pub use view::AggregateView;
