// ── Aggregation store ──
//
// Plain `&mut self` state: the orchestrator's owner task holds the only
// instance, so mutations are serialized by construction. Every mutation
// rebuilds the aggregate view and publishes it through a `watch`
// channel; readers only ever see complete snapshots.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::debug;

use super::entry::{GatewayEntry, Generation};
use crate::model::{AggregateView, Device, Gateway};
use crate::stream::ViewStream;

/// Owns the gateway -> devices mapping.
pub struct AggregationStore {
    entries: IndexMap<String, GatewayEntry>,
    last_generation: u64,
    view: watch::Sender<Arc<AggregateView>>,
}

impl Default for AggregationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregationStore {
    pub fn new() -> Self {
        let (view, _) = watch::channel(Arc::new(AggregateView::default()));
        Self {
            entries: IndexMap::new(),
            last_generation: 0,
            view,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Insert or replace the gateway stored under `name`.
    ///
    /// The existing device list is left untouched. Returns the
    /// generation to tag the fetch this resolution triggers.
    pub fn update_gateway(&mut self, name: &str, gateway: Gateway) -> Generation {
        let generation = self.next_generation();
        match self.entries.get_mut(name) {
            Some(entry) => entry.gateway = gateway,
            None => {
                self.entries
                    .insert(name.to_owned(), GatewayEntry::new(gateway, generation));
            }
        }
        self.publish();
        generation
    }

    /// Drop the gateway and its devices together. Returns whether it existed.
    pub fn remove_gateway(&mut self, name: &str) -> bool {
        let removed = self.entries.shift_remove(name).is_some();
        if removed {
            self.publish();
        }
        removed
    }

    /// Replace the device list of `name`, last write wins.
    ///
    /// A no-op for unknown gateways. Returns whether the list was stored.
    pub fn set_devices(&mut self, name: &str, devices: Vec<Device>) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            debug!(gateway = name, "devices for unknown gateway dropped");
            return false;
        };
        entry.devices = devices;
        self.publish();
        true
    }

    /// Replace the device list of `name` with the result of a fetch
    /// started at `generation`.
    ///
    /// Dropped if the gateway is unknown, was re-added after the fetch
    /// started, or already holds the result of a newer fetch.
    pub fn set_devices_at(&mut self, name: &str, generation: Generation, devices: Vec<Device>) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            debug!(gateway = name, "devices for unknown gateway dropped");
            return false;
        };
        if !entry.accepts(generation) {
            debug!(
                gateway = name,
                generation = generation.get(),
                applied = entry.applied.map(Generation::get),
                "stale device list dropped"
            );
            return false;
        }
        entry.devices = devices;
        entry.applied = Some(generation);
        self.publish();
        true
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current aggregate view.
    pub fn snapshot(&self) -> Arc<AggregateView> {
        self.view.borrow().clone()
    }

    /// Subscribe to every view published from now on.
    pub fn subscribe(&self) -> ViewStream {
        ViewStream::new(self.view.subscribe())
    }

    pub(crate) fn view_receiver(&self) -> watch::Receiver<Arc<AggregateView>> {
        self.view.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn next_generation(&mut self) -> Generation {
        self.last_generation += 1;
        Generation(self.last_generation)
    }

    fn publish(&self) {
        let view = AggregateView {
            gateways: self.entries.values().map(|e| e.gateway.clone()).collect(),
            devices: self
                .entries
                .values()
                .flat_map(|e| e.devices.iter().cloned())
                .collect(),
            updated_at: Some(Utc::now()),
        };
        self.view.send_replace(Arc::new(view));
    }
}
