// ── Resource client ──
//
// Single-resource read and write through a gateway. The gateway's
// status is passed through unclassified; only transport failures are
// errors.

use lwscout_api::{GatewayClient, RawResponse};
use serde::Serialize;
use tracing::debug;

use crate::config::ScoutConfig;
use crate::error::{CoreError, NetworkError};
use crate::model::ResourceCoordinate;

/// Status and body exactly as the gateway returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceResponse {
    pub status: u16,
    pub body: String,
}

impl ResourceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<RawResponse> for ResourceResponse {
    fn from(raw: RawResponse) -> Self {
        Self {
            status: raw.status,
            body: raw.body,
        }
    }
}

/// Reads and writes individual resources.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
}

impl ResourceClient {
    pub fn new(config: &ScoutConfig) -> Result<Self, CoreError> {
        Ok(Self::with_client(config.transport().build_client()?))
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `GET /api/clients/{ep}/{obj}/{inst}/{res}?timeout=5&format=TLV`
    pub async fn read_resource(&self, coordinate: &ResourceCoordinate) -> Result<ResourceResponse, NetworkError> {
        let client = self.client_for(coordinate)?;
        let resp = client
            .read_resource(
                &coordinate.endpoint,
                coordinate.object_id,
                coordinate.instance_id,
                coordinate.resource_id,
            )
            .await?;
        debug!(resource = %coordinate, status = resp.status, "resource read");
        Ok(resp.into())
    }

    /// `PUT` of `value` as `text/plain` to the same path as a read.
    pub async fn write_resource(
        &self,
        coordinate: &ResourceCoordinate,
        value: &str,
    ) -> Result<ResourceResponse, NetworkError> {
        let client = self.client_for(coordinate)?;
        let resp = client
            .write_resource(
                &coordinate.endpoint,
                coordinate.object_id,
                coordinate.instance_id,
                coordinate.resource_id,
                value,
            )
            .await?;
        debug!(resource = %coordinate, status = resp.status, "resource written");
        Ok(resp.into())
    }

    fn client_for(&self, coordinate: &ResourceCoordinate) -> Result<GatewayClient, NetworkError> {
        let base = lwscout_api::base_url(&coordinate.address, coordinate.port)?;
        Ok(GatewayClient::with_client(self.http.clone(), base))
    }
}
