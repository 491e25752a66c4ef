// ── Gateway and device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::resource::ResourceCoordinate;

/// A resolved gateway service.
///
/// Keyed by `name` in the aggregation store. Two gateways are the same
/// iff name, address and port all match; a re-resolution that changes
/// address or port replaces the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gateway {
    /// Service instance name as advertised over mDNS.
    pub name: String,
    /// IP literal (IPv4 or IPv6, unbracketed).
    pub address: String,
    /// Advertised service port (the CoAP listener).
    pub port: u16,
}

impl Gateway {
    pub fn new(name: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.name,
            lwscout_api::format_host(&self.address),
            self.port
        )
    }
}

/// A LwM2M client registered with a gateway.
///
/// `address` and `port` point at the owning gateway's REST bridge, so a
/// device carries everything needed to address its resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    pub endpoint: String,
    pub address: String,
    pub port: u16,
}

impl Device {
    pub fn new(endpoint: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            endpoint: endpoint.into(),
            address: address.into(),
            port,
        }
    }

    /// Coordinate of one resource on this device.
    pub fn resource(&self, object_id: u16, instance_id: u16, resource_id: u16) -> ResourceCoordinate {
        ResourceCoordinate {
            address: self.address.clone(),
            port: self.port,
            endpoint: self.endpoint.clone(),
            object_id,
            instance_id,
            resource_id,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}",
            self.endpoint,
            lwscout_api::format_host(&self.address),
            self.port
        )
    }
}
