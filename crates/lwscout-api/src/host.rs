// Host literal handling for gateway URLs.
//
// Discovery hands us bare IP literals. IPv6 literals must be wrapped in
// brackets before they can sit in the authority part of a URL.

use url::Url;

use crate::error::Error;

/// Format an address for use as a URL host.
///
/// Wraps IPv6 literals (anything containing `:`) in `[...]`. Already
/// bracketed input and IPv4 / hostnames pass through unchanged.
pub fn format_host(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{address}]")
    } else {
        address.to_owned()
    }
}

/// Build the REST root URL `http://{host}:{port}/` for a gateway.
pub fn base_url(address: &str, port: u16) -> Result<Url, Error> {
    let host = format_host(address);
    Ok(Url::parse(&format!("http://{host}:{port}/"))?)
}
