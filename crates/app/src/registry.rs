//! Device registry — the authoritative in-memory device set.
//!
//! The registry is the only shared mutable resource in the bridge. Every
//! operation takes the lock exactly once and never performs IO while holding
//! it, so a reconciliation merge and a dispatcher status update for the same
//! device can never interleave into a corrupt record.
//!
//! Membership rules: entries are added/updated by the reconciler, status is
//! cached by the dispatcher, and only the health monitor removes anything.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lightbridge_domain::device::{Device, DeviceHealth, DeviceInfo, LightStatus};
use lightbridge_domain::serial::Serial;

/// Map from serial (case-insensitive) to the current device record.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<Serial, Device>>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Serial, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or merge a device record, returning the resulting snapshot.
    ///
    /// An existing entry keeps its cached status; location and metadata are
    /// overwritten and the failure counter is reset — an upsert only ever
    /// follows a successful contact with the device.
    pub fn upsert(&self, info: DeviceInfo, address: IpAddr, port: u16) -> Device {
        let mut devices = self.lock();
        let serial = info.serial.clone();
        let merged = match devices.remove(&serial) {
            Some(existing) => Device {
                info,
                address,
                port,
                status: existing.status,
                health: DeviceHealth::fresh(),
            },
            None => Device::discovered(info, address, port),
        };
        devices.insert(serial, merged.clone());
        merged
    }

    /// Look up a device by serial. Absence is a normal outcome, never an
    /// error, and the lookup never touches the network.
    #[must_use]
    pub fn get(&self, serial: &Serial) -> Option<Device> {
        self.lock().get(serial).cloned()
    }

    /// Snapshot of every registered device.
    #[must_use]
    pub fn list_all(&self) -> Vec<Device> {
        self.lock().values().cloned().collect()
    }

    /// Remove a device, returning the removed record if it existed.
    ///
    /// Only the health monitor calls this.
    pub fn remove(&self, serial: &Serial) -> Option<Device> {
        self.lock().remove(serial)
    }

    /// Cache the status applied by a successful command.
    ///
    /// A successful command round-trip is also a successful contact, so the
    /// failure counter is reset and `last_seen` refreshed. Returns `false`
    /// when the serial is no longer registered (e.g. evicted mid-flight).
    pub fn update_status(&self, serial: &Serial, status: LightStatus) -> bool {
        let mut devices = self.lock();
        match devices.get_mut(serial) {
            Some(device) => {
                device.status = Some(status);
                device.health = DeviceHealth::fresh();
                true
            }
            None => false,
        }
    }

    /// Record a probe outcome, returning the new consecutive-failure count.
    ///
    /// Success resets the counter and refreshes `last_seen`; failure
    /// increments the counter and leaves `last_seen` untouched.
    pub fn record_health(&self, serial: &Serial, success: bool) -> Option<u32> {
        let mut devices = self.lock();
        let device = devices.get_mut(serial)?;
        if success {
            device.health = DeviceHealth::fresh();
        } else {
            device.health.consecutive_failures += 1;
        }
        Some(device.health.consecutive_failures)
    }

    /// Find the device currently registered at `address:port`, if any.
    ///
    /// Locations are not unique the way serials are: a stale record can
    /// point at an address that different hardware has since taken over,
    /// so this is a diagnostic query, never an identity check.
    #[must_use]
    pub fn find_by_location(&self, address: IpAddr, port: u16) -> Option<Device> {
        self.lock()
            .values()
            .find(|device| device.address == address && device.port == port)
            .cloned()
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
