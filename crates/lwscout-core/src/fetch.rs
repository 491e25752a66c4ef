// ── Device fetcher ──
//
// Polls one gateway's REST bridge for the devices registered with it
// and for the object instances a device announced. One shared
// `reqwest::Client` (one connection pool) serves every gateway.

use lwscout_api::{GatewayClient, RegisteredClient};
use tracing::debug;

use crate::config::ScoutConfig;
use crate::error::{CoreError, FetchError, NetworkError};
use crate::model::{Device, Gateway, ObjectInstance};

/// Fetches device lists and object links from gateways.
#[derive(Debug, Clone)]
pub struct DeviceFetcher {
    http: reqwest::Client,
    rest_port: u16,
}

impl DeviceFetcher {
    pub fn new(config: &ScoutConfig) -> Result<Self, CoreError> {
        let http = config.transport().build_client()?;
        Ok(Self::with_client(http, config.rest_port))
    }

    /// Use a pre-built client, e.g. one shared with a `ResourceClient`.
    pub fn with_client(http: reqwest::Client, rest_port: u16) -> Self {
        Self { http, rest_port }
    }

    pub fn rest_port(&self) -> u16 {
        self.rest_port
    }

    /// `GET http://{gateway}:{rest_port}/api/clients`
    ///
    /// All-or-nothing: any failure yields an error and no devices.
    pub async fn fetch_devices(&self, gateway: &Gateway) -> Result<Vec<Device>, FetchError> {
        let client = self.client_for(&gateway.address)?;
        let clients = client.list_clients().await?;
        let devices = devices_from_clients(&gateway.address, self.rest_port, &clients);
        debug!(
            gateway = %gateway.name,
            listed = clients.len(),
            devices = devices.len(),
            "device list fetched"
        );
        Ok(devices)
    }

    /// `GET http://{device}/api/clients/{endpoint}`, reduced to the
    /// object instances in `objectLinks`.
    pub async fn fetch_object_links(&self, device: &Device) -> Result<Vec<ObjectInstance>, FetchError> {
        let client = self.client_at(&device.address, device.port)?;
        let detail = client.client_detail(&device.endpoint).await?;
        let instances: Vec<ObjectInstance> = detail
            .object_links
            .iter()
            .filter_map(|link| link.object_instance())
            .map(|(object_id, instance_id)| ObjectInstance {
                object_id,
                instance_id,
            })
            .collect();
        debug!(
            endpoint = %device.endpoint,
            links = detail.object_links.len(),
            instances = instances.len(),
            "object links fetched"
        );
        Ok(instances)
    }

    fn client_for(&self, address: &str) -> Result<GatewayClient, NetworkError> {
        self.client_at(address, self.rest_port)
    }

    fn client_at(&self, address: &str, port: u16) -> Result<GatewayClient, NetworkError> {
        let base = lwscout_api::base_url(address, port)?;
        Ok(GatewayClient::with_client(self.http.clone(), base))
    }
}

/// Turn a decoded `/api/clients` listing into devices of the gateway at
/// `address`. Entries without an endpoint are skipped.
pub fn devices_from_clients(address: &str, rest_port: u16, clients: &[RegisteredClient]) -> Vec<Device> {
    clients
        .iter()
        .filter_map(RegisteredClient::endpoint)
        .map(|endpoint| Device::new(endpoint, address, rest_port))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fixture_with_empty_endpoint_yields_two_devices() {
        let body = r#"[
            {"endpoint": "dev1", "lifetime": 300},
            {"endpoint": ""},
            {"endpoint": "dev2", "bindingMode": "U"}
        ]"#;
        let clients = lwscout_api::parse_client_list(body).unwrap();

        let devices = devices_from_clients("10.0.0.5", 8088, &clients);

        assert_eq!(
            devices,
            vec![
                Device::new("dev1", "10.0.0.5", 8088),
                Device::new("dev2", "10.0.0.5", 8088),
            ]
        );
    }

    #[test]
    fn missing_endpoint_is_skipped() {
        let clients = lwscout_api::parse_client_list(r#"[{"lifetime": 30}]"#).unwrap();
        assert!(devices_from_clients("10.0.0.5", 8088, &clients).is_empty());
    }

    #[test]
    fn ipv6_gateway_address_is_kept_unbracketed() {
        let clients = lwscout_api::parse_client_list(r#"[{"endpoint": "dev1"}]"#).unwrap();
        let devices = devices_from_clients("fe80::1", 8088, &clients);
        assert_eq!(devices[0].address, "fe80::1");
    }
}
