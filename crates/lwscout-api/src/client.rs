// Gateway REST client
//
// Wraps `reqwest::Client` with gateway URL construction and the two
// response shapes the bridge uses: decoded JSON on 200, or the raw
// status and body for resource access. Endpoint groups (clients,
// resources) are implemented as inherent methods in separate files.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::host::base_url;
use crate::models::RawResponse;
use crate::transport::TransportConfig;

/// HTTP client for one gateway's REST bridge.
///
/// Cheap to clone: `reqwest::Client` is reference counted internally.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a client for the gateway at `address:port`.
    ///
    /// `address` is a bare IP literal as reported by discovery; IPv6
    /// literals are bracketed automatically.
    pub fn new(address: &str, port: u16, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: base_url(address, port)?,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this to share one connection pool across many gateways.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway REST root (e.g. `http://10.0.0.5:8088/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{segments...}`.
    ///
    /// Each segment is percent-encoded on its own, so endpoint names with
    /// `/` or spaces cannot escape their path position.
    pub(crate) fn api_url<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path; `Err` is only returned for
        // cannot-be-a-base URLs, which `base_url()` never produces.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a JSON document. Anything other than `200 OK` is an
    /// `Error::Status` and the body is not read.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// GET and return status and body verbatim.
    pub(crate) async fn get_raw(&self, url: Url) -> Result<RawResponse, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::into_raw(resp).await
    }

    /// PUT a `text/plain` body and return status and body verbatim.
    pub(crate) async fn put_text(&self, url: Url, value: &str) -> Result<RawResponse, Error> {
        debug!("PUT {}", url);

        // A `String` body gives reqwest a known length, so the request
        // goes out with Content-Length rather than chunked encoding.
        let resp = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(value.to_owned())
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::into_raw(resp).await
    }

    async fn into_raw(resp: reqwest::Response) -> Result<RawResponse, Error> {
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(Error::Transport)?;
        Ok(RawResponse { status, body })
    }
}
