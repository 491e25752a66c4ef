// ── Aggregate view ──

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::gateway::{Device, Gateway};

/// Immutable snapshot of every known gateway and the union of their
/// device lists.
///
/// Devices from different gateways are not deduplicated against each
/// other. Order follows gateway insertion order but is not part of the
/// contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateView {
    pub gateways: Vec<Gateway>,
    pub devices: Vec<Device>,
    /// When the store last changed. `None` for the initial empty view.
    pub updated_at: Option<DateTime<Utc>>,
}

impl AggregateView {
    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty() && self.devices.is_empty()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn gateway(&self, name: &str) -> Option<&Gateway> {
        self.gateways.iter().find(|g| g.name == name)
    }

    /// Devices reachable through the REST bridge at `address`.
    pub fn devices_at<'a>(&'a self, address: &'a str) -> impl Iterator<Item = &'a Device> + 'a {
        self.devices.iter().filter(move |d| d.address == address)
    }
}
