// Registered client (LwM2M device) endpoints
//
// The gateway keeps a registry of devices that completed LwM2M
// registration. Listing returns one JSON object per device; the detail
// call adds the object links the device announced.

use tracing::debug;

use crate::client::GatewayClient;
use crate::error::Error;
use crate::models::{ClientDetail, RegisteredClient};

impl GatewayClient {
    /// List all devices registered with this gateway.
    ///
    /// `GET /api/clients`
    pub async fn list_clients(&self) -> Result<Vec<RegisteredClient>, Error> {
        let url = self.api_url(["clients"]);
        debug!("listing registered clients");
        self.get_json(url).await
    }

    /// Fetch one device's registration detail, including object links.
    ///
    /// `GET /api/clients/{endpoint}`
    pub async fn client_detail(&self, endpoint: &str) -> Result<ClientDetail, Error> {
        let url = self.api_url(["clients", endpoint]);
        debug!(endpoint, "fetching client detail");
        self.get_json(url).await
    }
}

/// Decode a `/api/clients` body without going over the network.
pub fn parse_client_list(body: &str) -> Result<Vec<RegisteredClient>, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}
