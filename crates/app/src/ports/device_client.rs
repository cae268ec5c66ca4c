//! Device client port — the control protocol spoken to a single light.
//!
//! This is a **port** — the `elgato` adapter provides the HTTP
//! implementation. All calls are bounded by the adapter's request timeout,
//! and the adapter guarantees that requests to one device never overlap.
//! Retries are the caller's concern, never the adapter's.

use std::future::Future;
use std::net::IpAddr;

use lightbridge_domain::command::{Brightness, ColorTemperature};
use lightbridge_domain::device::{Device, DeviceInfo, LightStatus};
use lightbridge_domain::error::BridgeError;
use lightbridge_domain::serial::Serial;

/// Control client for the lights' HTTP protocol.
pub trait DeviceClient: Send + Sync {
    /// Fetch static metadata from a device that is not yet registered.
    ///
    /// Addressed by location because the serial is not known until the
    /// device answers.
    fn describe(
        &self,
        address: IpAddr,
        port: u16,
    ) -> impl Future<Output = Result<DeviceInfo, BridgeError>> + Send;

    /// Read the device's full current status.
    fn get_status(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<LightStatus, BridgeError>> + Send;

    /// Switch the device on or off, returning the applied status.
    fn set_power(
        &self,
        device: &Device,
        on: bool,
    ) -> impl Future<Output = Result<LightStatus, BridgeError>> + Send;

    /// Set the brightness, returning the applied status.
    fn set_brightness(
        &self,
        device: &Device,
        level: Brightness,
    ) -> impl Future<Output = Result<LightStatus, BridgeError>> + Send;

    /// Set the colour temperature, returning the applied status.
    fn set_color_temperature(
        &self,
        device: &Device,
        kelvin: ColorTemperature,
    ) -> impl Future<Output = Result<LightStatus, BridgeError>> + Send;

    /// Cheap reachability check — connection plus an HTTP 2xx, no body
    /// parsing. Distinct from a full status fetch.
    fn probe(&self, device: &Device) -> impl Future<Output = bool> + Send;

    /// Release any connection resources held for an evicted device.
    fn forget(&self, serial: &Serial);
}
