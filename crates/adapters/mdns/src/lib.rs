//! mDNS discovery adapter.
//!
//! ## Responsibilities
//!
//! - Browse the local network for `_elg._tcp.local.` advertisements.
//! - Collect resolved locations into deduplicated [`Candidate`]s within a
//!   bounded window.
//!
//! ## Dependency rule
//!
//! Implements the `LightBrowser` port from `lightbridge-app`; discovery
//! yields locations only, never identities.

use std::collections::HashSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use mdns_sd::{ServiceDaemon, ServiceEvent};

use lightbridge_app::ports::{Candidate, LightBrowser};
use lightbridge_domain::error::BridgeError;

/// mDNS browse session factory.
///
/// Each browse spins up a short-lived daemon on a blocking thread; the
/// daemon is torn down when the window closes.
#[derive(Debug, Clone)]
pub struct MdnsBrowser {
    service_type: String,
}

impl MdnsBrowser {
    /// Service type advertised by Elgato Key Lights.
    pub const SERVICE_TYPE: &'static str = "_elg._tcp.local.";

    #[must_use]
    pub fn new() -> Self {
        Self::with_service_type(Self::SERVICE_TYPE)
    }

    #[must_use]
    pub fn with_service_type(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
        }
    }
}

impl Default for MdnsBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl LightBrowser for MdnsBrowser {
    async fn browse(&self, timeout: Duration) -> Result<Vec<Candidate>, BridgeError> {
        let service_type = self.service_type.clone();
        tokio::task::spawn_blocking(move || browse_blocking(&service_type, timeout))
            .await
            .map_err(|err| BridgeError::Discovery(Box::new(err)))?
    }
}

fn browse_blocking(service_type: &str, timeout: Duration) -> Result<Vec<Candidate>, BridgeError> {
    let daemon = ServiceDaemon::new().map_err(|err| BridgeError::Discovery(Box::new(err)))?;
    let receiver = daemon
        .browse(service_type)
        .map_err(|err| BridgeError::Discovery(Box::new(err)))?;

    let deadline = Instant::now() + timeout;
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match receiver.recv_timeout(remaining) {
            Ok(ServiceEvent::ServiceResolved(info)) => {
                tracing::debug!(
                    fullname = info.get_fullname(),
                    port = info.get_port(),
                    "service resolved"
                );
                collect(
                    &mut found,
                    &mut seen,
                    info.get_addresses().iter().copied(),
                    info.get_port(),
                );
            }
            Ok(_) => {}
            // Channel timed out or closed; either way the window is over.
            Err(_) => break,
        }
    }

    if let Err(err) = daemon.stop_browse(service_type) {
        tracing::debug!(%err, "failed to stop mdns browse");
    }
    if let Err(err) = daemon.shutdown() {
        tracing::debug!(%err, "failed to shut down mdns daemon");
    }
    Ok(found)
}

/// Fold one resolved service into the candidate list, skipping duplicates.
/// A service advertising several addresses yields one candidate per address.
fn collect(
    found: &mut Vec<Candidate>,
    seen: &mut HashSet<Candidate>,
    addresses: impl Iterator<Item = IpAddr>,
    port: u16,
) {
    for address in addresses {
        let candidate = Candidate { address, port };
        if seen.insert(candidate) {
            found.push(candidate);
        }
    }
}
