// ── mDNS backend ──
//
// `ServiceBrowser` over the `mdns-sd` daemon. The daemon resolves every
// record it sees on its own, so name filtering happens on the events
// rather than before resolution.

use std::net::IpAddr;

use futures_util::{StreamExt, future};
use mdns_sd::{ServiceDaemon, ServiceEvent};
use tracing::{debug, trace};

use super::{BrowseEvent, BrowseStream, ServiceBrowser};
use crate::error::DiscoveryError;

/// mDNS-SD service browser backed by a background `ServiceDaemon`.
pub struct MdnsBrowser {
    daemon: ServiceDaemon,
}

impl MdnsBrowser {
    /// Spawn the mDNS daemon thread.
    pub fn new() -> Result<Self, DiscoveryError> {
        let daemon = ServiceDaemon::new().map_err(|e| DiscoveryError::Backend(e.to_string()))?;
        Ok(Self { daemon })
    }
}

impl ServiceBrowser for MdnsBrowser {
    fn browse(&self, service_type: &str) -> Result<BrowseStream, DiscoveryError> {
        let domain = browse_domain(service_type);
        debug!(%domain, "mdns browse");
        let receiver = self
            .daemon
            .browse(&domain)
            .map_err(|e| DiscoveryError::StartFailed(e.to_string()))?;

        Ok(receiver
            .into_stream()
            .filter_map(move |event| future::ready(translate(&domain, event)))
            .boxed())
    }

    fn stop_browse(&self, service_type: &str) -> Result<(), DiscoveryError> {
        self.daemon
            .stop_browse(&browse_domain(service_type))
            .map_err(|e| DiscoveryError::StopFailed(e.to_string()))
    }
}

impl Drop for MdnsBrowser {
    fn drop(&mut self) {
        if let Err(e) = self.daemon.shutdown() {
            debug!(error = %e, "mdns daemon shutdown failed");
        }
    }
}

/// `_lwm2m._udp.` -> `_lwm2m._udp.local.`
fn browse_domain(service_type: &str) -> String {
    let bare = service_type.trim_end_matches('.');
    if bare.ends_with(".local") {
        format!("{bare}.")
    } else {
        format!("{bare}.local.")
    }
}

/// Strip `.{domain}` from a full service name to get the instance name.
fn instance_name(fullname: &str, domain: &str) -> String {
    fullname
        .strip_suffix(domain)
        .map_or(fullname, |s| s.trim_end_matches('.'))
        .to_owned()
}

fn translate(domain: &str, event: ServiceEvent) -> Option<BrowseEvent> {
    match event {
        ServiceEvent::ServiceFound(service_type, fullname) => Some(BrowseEvent::Found {
            name: instance_name(&fullname, domain),
            service_type,
        }),
        ServiceEvent::ServiceResolved(info) => {
            let mut addresses: Vec<IpAddr> = info.get_addresses().iter().copied().collect();
            addresses.sort();
            Some(BrowseEvent::Resolved {
                name: instance_name(info.get_fullname(), domain),
                service_type: info.get_type().to_owned(),
                addresses,
                port: info.get_port(),
            })
        }
        ServiceEvent::ServiceRemoved(service_type, fullname) => Some(BrowseEvent::Removed {
            name: instance_name(&fullname, domain),
            service_type,
        }),
        other => {
            trace!(event = ?other, "mdns event ignored");
            None
        }
    }
}
