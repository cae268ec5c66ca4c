//! Elgato Key Light control adapter.
//!
//! ## Responsibilities
//!
//! - Speak the lights' HTTP+JSON protocol (`/elgato/lights`,
//!   `/elgato/accessory-info`) over plain HTTP.
//! - Translate between the wire representation and the domain model,
//!   including the nonlinear Kelvin encoding.
//! - Serialize requests per device: commands to one light never overlap,
//!   commands to different lights proceed concurrently.
//!
//! ## Dependency rule
//!
//! Implements the `DeviceClient` port from `lightbridge-app`; nothing in
//! the application layer depends on this crate.

pub mod convert;
mod error;
mod wire;

pub use error::ElgatoError;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;

use lightbridge_app::ports::DeviceClient;
use lightbridge_domain::command::{Brightness, ColorTemperature};
use lightbridge_domain::device::{Device, DeviceInfo, LightStatus};
use lightbridge_domain::error::BridgeError;
use lightbridge_domain::serial::Serial;

use crate::wire::{AccessoryInfo, LightsEnvelope};

/// HTTP client for Elgato Key Lights.
///
/// One instance serves every device; per-device request serialization is
/// handled internally.
pub struct ElgatoClient {
    http: reqwest::Client,
    guards: Mutex<HashMap<Serial, Arc<tokio::sync::Mutex<()>>>>,
}

impl ElgatoClient {
    /// Build a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(request_timeout: Duration) -> Result<Self, ElgatoError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(ElgatoError::ClientBuild)?;
        Ok(Self {
            http,
            guards: Mutex::new(HashMap::new()),
        })
    }

    fn lock_guards(&self) -> MutexGuard<'_, HashMap<Serial, Arc<tokio::sync::Mutex<()>>>> {
        self.guards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The serialization mutex for one device, created on first use.
    fn guard_for(&self, serial: &Serial) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(
            self.lock_guards()
                .entry(serial.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn lights_url(address: IpAddr, port: u16) -> String {
        format!("http://{address}:{port}/elgato/lights")
    }

    fn info_url(address: IpAddr, port: u16) -> String {
        format!("http://{address}:{port}/elgato/accessory-info")
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ElgatoError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ElgatoError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response = response
            .error_for_status()
            .map_err(|source| ElgatoError::Status {
                url: url.to_string(),
                source,
            })?;
        response.json().await.map_err(|source| ElgatoError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn put_lights(
        &self,
        device: &Device,
        body: &LightsEnvelope,
    ) -> Result<LightStatus, ElgatoError> {
        let (address, port) = device.location();
        let url = Self::lights_url(address, port);
        let response = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ElgatoError::Transport {
                url: url.clone(),
                source,
            })?;
        let response = response
            .error_for_status()
            .map_err(|source| ElgatoError::Status {
                url: url.clone(),
                source,
            })?;
        let envelope: LightsEnvelope =
            response
                .json()
                .await
                .map_err(|source| ElgatoError::Decode { url, source })?;
        envelope.into_status()
    }
}

impl DeviceClient for ElgatoClient {
    #[tracing::instrument(skip(self))]
    async fn describe(&self, address: IpAddr, port: u16) -> Result<DeviceInfo, BridgeError> {
        // No serial yet, so no per-device guard to take.
        let info: AccessoryInfo = self.fetch_json(&Self::info_url(address, port)).await?;
        Ok(info.into())
    }

    async fn get_status(&self, device: &Device) -> Result<LightStatus, BridgeError> {
        let guard = self.guard_for(device.serial());
        let _held = guard.lock().await;
        let (address, port) = device.location();
        let envelope: LightsEnvelope = self.fetch_json(&Self::lights_url(address, port)).await?;
        Ok(envelope.into_status()?)
    }

    async fn set_power(&self, device: &Device, on: bool) -> Result<LightStatus, BridgeError> {
        let guard = self.guard_for(device.serial());
        let _held = guard.lock().await;
        Ok(self.put_lights(device, &LightsEnvelope::power(on)).await?)
    }

    async fn set_brightness(
        &self,
        device: &Device,
        level: Brightness,
    ) -> Result<LightStatus, BridgeError> {
        let guard = self.guard_for(device.serial());
        let _held = guard.lock().await;
        Ok(self
            .put_lights(device, &LightsEnvelope::brightness(level))
            .await?)
    }

    async fn set_color_temperature(
        &self,
        device: &Device,
        kelvin: ColorTemperature,
    ) -> Result<LightStatus, BridgeError> {
        let guard = self.guard_for(device.serial());
        let _held = guard.lock().await;
        Ok(self
            .put_lights(device, &LightsEnvelope::temperature(kelvin))
            .await?)
    }

    async fn probe(&self, device: &Device) -> bool {
        let guard = self.guard_for(device.serial());
        let _held = guard.lock().await;
        let (address, port) = device.location();
        let url = Self::info_url(address, port);
        match self.http.head(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::debug!(serial = %device.serial(), %err, "probe request failed");
                false
            }
        }
    }

    fn forget(&self, serial: &Serial) {
        self.lock_guards().remove(serial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_client_with_timeout() {
        assert!(ElgatoClient::new(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn should_reuse_the_same_guard_per_serial() {
        let client = ElgatoClient::new(Duration::from_secs(5)).unwrap();
        let first = client.guard_for(&Serial::new("SN123"));
        let again = client.guard_for(&Serial::new("sn123"));
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn should_use_distinct_guards_for_distinct_serials() {
        let client = ElgatoClient::new(Duration::from_secs(5)).unwrap();
        let first = client.guard_for(&Serial::new("SN1"));
        let second = client.guard_for(&Serial::new("SN2"));
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn should_drop_guard_on_forget() {
        let client = ElgatoClient::new(Duration::from_secs(5)).unwrap();
        let first = client.guard_for(&Serial::new("SN123"));
        client.forget(&Serial::new("SN123"));
        let fresh = client.guard_for(&Serial::new("SN123"));
        assert!(!Arc::ptr_eq(&first, &fresh));
    }

    #[test]
    fn should_format_device_urls() {
        let address: IpAddr = "10.0.0.5".parse().unwrap();
        assert_eq!(
            ElgatoClient::lights_url(address, 9123),
            "http://10.0.0.5:9123/elgato/lights"
        );
        assert_eq!(
            ElgatoClient::info_url(address, 9123),
            "http://10.0.0.5:9123/elgato/accessory-info"
        );
    }
}
