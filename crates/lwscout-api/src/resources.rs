// Resource access endpoints
//
// Single-resource read and write through the gateway:
// `/api/clients/{endpoint}/{objectId}/{instanceId}/{resourceId}`.
// Both calls always carry `timeout=5&format=TLV` and hand back the
// gateway's status and body untouched.

use tracing::debug;
use url::Url;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::models::RawResponse;

/// Seconds the gateway waits on the device before giving up.
const DEVICE_TIMEOUT_SECS: &str = "5";
/// Content format requested from the device.
const CONTENT_FORMAT: &str = "TLV";

impl GatewayClient {
    /// Build the resource URL with its fixed query string.
    pub fn resource_url(
        &self,
        endpoint: &str,
        object_id: u16,
        instance_id: u16,
        resource_id: u16,
    ) -> Url {
        let mut url = self.api_url([
            "clients",
            endpoint,
            object_id.to_string().as_str(),
            instance_id.to_string().as_str(),
            resource_id.to_string().as_str(),
        ]);
        url.query_pairs_mut()
            .append_pair("timeout", DEVICE_TIMEOUT_SECS)
            .append_pair("format", CONTENT_FORMAT);
        url
    }

    /// Read one resource value.
    ///
    /// `GET /api/clients/{ep}/{obj}/{inst}/{res}?timeout=5&format=TLV`
    pub async fn read_resource(
        &self,
        endpoint: &str,
        object_id: u16,
        instance_id: u16,
        resource_id: u16,
    ) -> Result<RawResponse, Error> {
        let url = self.resource_url(endpoint, object_id, instance_id, resource_id);
        debug!(endpoint, object_id, instance_id, resource_id, "reading resource");
        self.get_raw(url).await
    }

    /// Write one resource value as `text/plain`.
    ///
    /// `PUT /api/clients/{ep}/{obj}/{inst}/{res}?timeout=5&format=TLV`
    pub async fn write_resource(
        &self,
        endpoint: &str,
        object_id: u16,
        instance_id: u16,
        resource_id: u16,
        value: &str,
    ) -> Result<RawResponse, Error> {
        let url = self.resource_url(endpoint, object_id, instance_id, resource_id);
        debug!(endpoint, object_id, instance_id, resource_id, "writing resource");
        self.put_text(url, value).await
    }
}
