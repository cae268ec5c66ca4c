//! Discovery port — the service-discovery collaborator.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use lightbridge_domain::error::BridgeError;

/// A network location where a compatible device advertised itself.
///
/// Discovery yields locations only; identity (the serial) is learned from
/// the device itself via [`DeviceClient::describe`](super::DeviceClient::describe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub address: IpAddr,
    pub port: u16,
}

/// Timeout-bounded browse session for compatible devices.
///
/// Implementations must return within roughly `timeout`; dropping the
/// returned future abandons the browse.
pub trait LightBrowser: Send + Sync {
    /// Collect the candidates that advertised within `timeout`.
    fn browse(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<Candidate>, BridgeError>> + Send;
}
