// ── Aggregation store ──
//
// Authoritative gateway -> devices mapping with snapshot publication
// over a `watch` channel.

mod aggregation;
mod entry;

pub use aggregation::AggregationStore;
pub use entry::Generation;
