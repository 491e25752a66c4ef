// Wire models for the gateway REST bridge.
//
// The bridge returns loosely shaped JSON. Only the fields we consume are
// modelled; everything else is ignored by serde.

use serde::{Deserialize, Serialize};

/// One entry of `GET /api/clients`.
///
/// `endpoint` is optional on the wire: entries without it (or with an
/// empty string) are dropped by the caller rather than failing the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegisteredClient {
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl RegisteredClient {
    /// The endpoint name, if present and non-empty.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }
}

/// Body of `GET /api/clients/{endpoint}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub object_links: Vec<ObjectLinkEntry>,
}

/// One `objectLinks` entry, e.g. `{"url": "/3311/0"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectLinkEntry {
    #[serde(default)]
    pub url: String,
}

impl ObjectLinkEntry {
    /// Split `/{objId}/{instId}` into its numeric parts.
    ///
    /// Returns `None` when the url has fewer than two segments after the
    /// leading slash or either segment is not a number. Extra trailing
    /// segments are ignored.
    pub fn object_instance(&self) -> Option<(u16, u16)> {
        let mut parts = self.url.split('/');
        // Leading segment is whatever precedes the first slash (usually empty).
        parts.next()?;
        let object_id = parts.next()?.parse().ok()?;
        let instance_id = parts.next()?.parse().ok()?;
        Some((object_id, instance_id))
    }
}

/// Status and body exactly as the gateway sent them.
///
/// Resource reads and writes do not classify the status; callers decide
/// what a 4xx / 5xx means for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
