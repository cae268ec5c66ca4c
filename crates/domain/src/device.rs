//! Device records — the sole entity the registry manages.

use std::net::IpAddr;

use serde::Serialize;

use crate::command::{Brightness, ColorTemperature};
use crate::serial::Serial;
use crate::time::{self, Timestamp};

/// Static metadata fetched once from a light's accessory-info endpoint.
///
/// Immutable for the device's registry lifetime; re-fetched only if the
/// device is re-added after an eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial: Serial,
    pub display_name: String,
    pub product_name: String,
    pub firmware_version: String,
    pub firmware_build_number: u32,
    pub hardware_board_type: u32,
}

/// Last status observed on a light. Stale between reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightStatus {
    pub on: bool,
    pub brightness: Brightness,
    pub temperature: ColorTemperature,
}

/// Reachability bookkeeping, maintained by probes and successful commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceHealth {
    pub consecutive_failures: u32,
    pub last_seen: Timestamp,
}

impl DeviceHealth {
    /// Health state for a device we just heard from.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            consecutive_failures: 0,
            last_seen: time::now(),
        }
    }
}

/// A known light: identity, current network location, cached status, health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub info: DeviceInfo,
    pub address: IpAddr,
    pub port: u16,
    pub status: Option<LightStatus>,
    pub health: DeviceHealth,
}

impl Device {
    /// A freshly discovered device: no cached status, clean health.
    #[must_use]
    pub fn discovered(info: DeviceInfo, address: IpAddr, port: u16) -> Self {
        Self {
            info,
            address,
            port,
            status: None,
            health: DeviceHealth::fresh(),
        }
    }

    /// The device's stable identity.
    #[must_use]
    pub fn serial(&self) -> &Serial {
        &self.info.serial
    }

    /// The device's current network location.
    #[must_use]
    pub fn location(&self) -> (IpAddr, u16) {
        (self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_info(serial: &str) -> DeviceInfo {
        DeviceInfo {
            serial: Serial::new(serial),
            display_name: "Desk Light".to_string(),
            product_name: "Elgato Key Light".to_string(),
            firmware_version: "1.0.3".to_string(),
            firmware_build_number: 194,
            hardware_board_type: 53,
        }
    }

    #[test]
    fn should_start_discovered_device_with_no_status() {
        let device = Device::discovered(sample_info("SN123"), "10.0.0.5".parse().unwrap(), 9123);
        assert!(device.status.is_none());
        assert_eq!(device.health.consecutive_failures, 0);
    }

    #[test]
    fn should_expose_serial_and_location() {
        let device = Device::discovered(sample_info("sn123"), "10.0.0.5".parse().unwrap(), 9123);
        assert_eq!(device.serial(), &Serial::new("SN123"));
        assert_eq!(device.location(), ("10.0.0.5".parse().unwrap(), 9123));
    }

    #[test]
    fn should_mark_fresh_health_as_seen_now() {
        let before = time::now();
        let health = DeviceHealth::fresh();
        assert!(health.last_seen >= before);
        assert_eq!(health.consecutive_failures, 0);
    }
}
