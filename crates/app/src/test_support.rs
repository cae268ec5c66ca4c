//! In-memory fakes for the port traits, shared by the component tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use lightbridge_domain::command::{Brightness, ColorTemperature};
use lightbridge_domain::device::{Device, DeviceInfo, LightStatus};
use lightbridge_domain::error::BridgeError;
use lightbridge_domain::serial::Serial;

use crate::ports::{Candidate, DeviceClient, LightBrowser};

pub fn info(serial: &str) -> DeviceInfo {
    DeviceInfo {
        serial: Serial::new(serial),
        display_name: format!("Light {serial}"),
        product_name: "Elgato Key Light".to_string(),
        firmware_version: "1.0.3".to_string(),
        firmware_build_number: 194,
        hardware_board_type: 53,
    }
}

pub fn status(on: bool, brightness: i64, kelvin: i64) -> LightStatus {
    LightStatus {
        on,
        brightness: Brightness::new(brightness).unwrap(),
        temperature: ColorTemperature::new(kelvin).unwrap(),
    }
}

pub fn candidate(address: &str, port: u16) -> Candidate {
    Candidate {
        address: address.parse().unwrap(),
        port,
    }
}

pub fn unreachable() -> BridgeError {
    BridgeError::DeviceUnreachable(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    )))
}

pub fn discovery_failure() -> BridgeError {
    BridgeError::Discovery(Box::new(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "browse timed out",
    )))
}

/// Fake device client with programmable devices and recorded calls.
#[derive(Default)]
pub struct FakeClient {
    infos: Mutex<HashMap<(IpAddr, u16), DeviceInfo>>,
    statuses: Mutex<HashMap<Serial, LightStatus>>,
    offline: Mutex<HashSet<Serial>>,
    pub describe_calls: Mutex<Vec<(IpAddr, u16)>>,
    pub status_calls: Mutex<Vec<Serial>>,
    pub set_calls: Mutex<Vec<(Serial, &'static str)>>,
    pub forgotten: Mutex<Vec<Serial>>,
}

impl FakeClient {
    /// Register a fake light answering at `address:port`.
    pub fn add_device(&self, address: &str, port: u16, serial: &str, st: LightStatus) {
        let addr: IpAddr = address.parse().unwrap();
        self.infos.lock().unwrap().insert((addr, port), info(serial));
        self.statuses.lock().unwrap().insert(Serial::new(serial), st);
    }

    /// Make every call addressed to `serial` fail from now on.
    pub fn set_offline(&self, serial: &str) {
        self.offline.lock().unwrap().insert(Serial::new(serial));
    }

    pub fn set_online(&self, serial: &str) {
        self.offline.lock().unwrap().remove(&Serial::new(serial));
    }

    pub fn network_calls(&self) -> usize {
        self.describe_calls.lock().unwrap().len()
            + self.status_calls.lock().unwrap().len()
            + self.set_calls.lock().unwrap().len()
    }

    fn apply(
        &self,
        device: &Device,
        action: &'static str,
        mutate: impl FnOnce(&mut LightStatus),
    ) -> Result<LightStatus, BridgeError> {
        self.set_calls
            .lock()
            .unwrap()
            .push((device.serial().clone(), action));
        if self.offline.lock().unwrap().contains(device.serial()) {
            return Err(unreachable());
        }
        let mut statuses = self.statuses.lock().unwrap();
        let st = statuses
            .entry(device.serial().clone())
            .or_insert_with(|| status(false, 20, 4000));
        mutate(st);
        Ok(*st)
    }
}

impl DeviceClient for FakeClient {
    async fn describe(&self, address: IpAddr, port: u16) -> Result<DeviceInfo, BridgeError> {
        self.describe_calls.lock().unwrap().push((address, port));
        self.infos
            .lock()
            .unwrap()
            .get(&(address, port))
            .cloned()
            .ok_or_else(unreachable)
    }

    async fn get_status(&self, device: &Device) -> Result<LightStatus, BridgeError> {
        self.status_calls.lock().unwrap().push(device.serial().clone());
        if self.offline.lock().unwrap().contains(device.serial()) {
            return Err(unreachable());
        }
        self.statuses
            .lock()
            .unwrap()
            .get(device.serial())
            .copied()
            .ok_or_else(unreachable)
    }

    async fn set_power(&self, device: &Device, on: bool) -> Result<LightStatus, BridgeError> {
        self.apply(device, "power", |st| st.on = on)
    }

    async fn set_brightness(
        &self,
        device: &Device,
        level: Brightness,
    ) -> Result<LightStatus, BridgeError> {
        self.apply(device, "brightness", |st| st.brightness = level)
    }

    async fn set_color_temperature(
        &self,
        device: &Device,
        kelvin: ColorTemperature,
    ) -> Result<LightStatus, BridgeError> {
        self.apply(device, "color", |st| st.temperature = kelvin)
    }

    async fn probe(&self, device: &Device) -> bool {
        !self.offline.lock().unwrap().contains(device.serial())
    }

    fn forget(&self, serial: &Serial) {
        self.forgotten.lock().unwrap().push(serial.clone());
    }
}

/// Fake browser with an optional queue of per-attempt results and a
/// fallback candidate list.
#[derive(Default)]
pub struct FakeBrowser {
    queue: Mutex<VecDeque<Result<Vec<Candidate>, BridgeError>>>,
    fallback: Mutex<Vec<Candidate>>,
    calls: Mutex<usize>,
}

impl FakeBrowser {
    pub fn returning(candidates: Vec<Candidate>) -> Self {
        let browser = Self::default();
        *browser.fallback.lock().unwrap() = candidates;
        browser
    }

    pub fn set_fallback(&self, candidates: Vec<Candidate>) {
        *self.fallback.lock().unwrap() = candidates;
    }

    /// Queue a one-shot result consumed before the fallback applies.
    pub fn push_attempt(&self, result: Result<Vec<Candidate>, BridgeError>) {
        self.queue.lock().unwrap().push_back(result);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl LightBrowser for FakeBrowser {
    async fn browse(&self, _timeout: Duration) -> Result<Vec<Candidate>, BridgeError> {
        *self.calls.lock().unwrap() += 1;
        if let Some(next) = self.queue.lock().unwrap().pop_front() {
            return next;
        }
        Ok(self.fallback.lock().unwrap().clone())
    }
}
