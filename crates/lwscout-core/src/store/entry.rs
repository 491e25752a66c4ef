// ── Per-gateway store entry ──

use crate::model::{Device, Gateway};

/// Store-wide, monotonically increasing stamp handed out by each
/// `update_gateway` call.
///
/// A fetch result carries the generation of the resolution that started
/// it, which lets the store drop results that were overtaken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub(crate) u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(super) struct GatewayEntry {
    pub gateway: Gateway,
    /// Generation at which this name was (re)inserted after being absent.
    pub created: Generation,
    /// Generation of the fetch whose devices are currently stored.
    pub applied: Option<Generation>,
    pub devices: Vec<Device>,
}

impl GatewayEntry {
    pub fn new(gateway: Gateway, generation: Generation) -> Self {
        Self {
            gateway,
            created: generation,
            applied: None,
            devices: Vec::new(),
        }
    }

    /// Whether a fetch started at `generation` may overwrite the devices.
    pub fn accepts(&self, generation: Generation) -> bool {
        generation >= self.created && self.applied.is_none_or(|applied| generation >= applied)
    }
}
