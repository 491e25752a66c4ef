// ── Object / resource domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

/// One resource entry of an object schema.
///
/// `operations` and `value_type` are kept exactly as written in the
/// schema. Use [`operations()`](Self::operations) for the decoded set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub id: u16,
    pub name: String,
    /// Capability letters, e.g. `"RW"` or `"E"`.
    pub operations: String,
    /// Advisory value type, e.g. `"Float"`.
    pub value_type: String,
}

impl ResourceDefinition {
    pub fn operations(&self) -> Operations {
        Operations::parse(&self.operations)
    }
}

/// Decoded capability letters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operations {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Operations {
    /// Decode a capability string. Letters are matched case-sensitively
    /// anywhere in the string; anything else is ignored.
    pub fn parse(letters: &str) -> Self {
        Self {
            read: letters.contains('R'),
            write: letters.contains('W'),
            execute: letters.contains('E'),
        }
    }

    pub fn is_empty(self) -> bool {
        !(self.read || self.write || self.execute)
    }
}

impl fmt::Display for Operations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (enabled, letter) in [(self.read, 'R'), (self.write, 'W'), (self.execute, 'E')] {
            if enabled {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Fully qualified address of one remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCoordinate {
    /// Gateway REST bridge address (IP literal or hostname).
    pub address: String,
    pub port: u16,
    pub endpoint: String,
    pub object_id: u16,
    pub instance_id: u16,
    pub resource_id: u16,
}

impl fmt::Display for ResourceCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.endpoint, self.object_id, self.instance_id, self.resource_id
        )
    }
}

/// An object instance a device announced in its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub object_id: u16,
    pub instance_id: u16,
}

impl fmt::Display for ObjectInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.object_id, self.instance_id)
    }
}
