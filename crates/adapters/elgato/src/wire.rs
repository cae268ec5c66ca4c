//! Wire payloads of the Elgato HTTP+JSON protocol.
//!
//! Commands always address a single light: request bodies are
//! `{"lights":[{<field>:<value>}]}` with exactly one element carrying only
//! the commanded field. Responses echo the full applied state. Older
//! firmwares include a `numberOfLights` field on responses; it is accepted
//! and ignored, and never sent.

use serde::{Deserialize, Serialize};

use lightbridge_domain::command::{Brightness, ColorTemperature};
use lightbridge_domain::device::{DeviceInfo, LightStatus};
use lightbridge_domain::serial::Serial;

use crate::convert;
use crate::error::ElgatoError;

/// `GET /elgato/accessory-info` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryInfo {
    pub product_name: String,
    pub hardware_board_type: u32,
    pub firmware_build_number: u32,
    pub firmware_version: String,
    pub serial_number: String,
    pub display_name: String,
}

impl From<AccessoryInfo> for DeviceInfo {
    fn from(info: AccessoryInfo) -> Self {
        Self {
            serial: Serial::new(&info.serial_number),
            display_name: info.display_name,
            product_name: info.product_name,
            firmware_version: info.firmware_version,
            firmware_build_number: info.firmware_build_number,
            hardware_board_type: info.hardware_board_type,
        }
    }
}

/// One entry of a lights payload. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WireLight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<u32>,
}

/// `GET`/`PUT /elgato/lights` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightsEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_lights: Option<u32>,
    pub lights: Vec<WireLight>,
}

impl LightsEnvelope {
    fn single(light: WireLight) -> Self {
        Self {
            number_of_lights: None,
            lights: vec![light],
        }
    }

    /// Request body switching the light on or off.
    #[must_use]
    pub fn power(on: bool) -> Self {
        Self::single(WireLight {
            on: Some(u8::from(on)),
            ..WireLight::default()
        })
    }

    /// Request body setting the brightness percentage.
    #[must_use]
    pub fn brightness(level: Brightness) -> Self {
        Self::single(WireLight {
            brightness: Some(level.value()),
            ..WireLight::default()
        })
    }

    /// Request body setting the colour temperature, encoded to the native
    /// register.
    #[must_use]
    pub fn temperature(kelvin: ColorTemperature) -> Self {
        Self::single(WireLight {
            temperature: Some(convert::kelvin_to_native(kelvin.kelvin())),
            ..WireLight::default()
        })
    }

    /// Interpret a response as the full applied status.
    ///
    /// # Errors
    ///
    /// Returns [`ElgatoError`] when the lights array is empty, any status
    /// field is missing, or the native temperature is zero. A partial
    /// response never becomes a partial status.
    pub fn into_status(self) -> Result<LightStatus, ElgatoError> {
        let light = self
            .lights
            .into_iter()
            .next()
            .ok_or(ElgatoError::EmptyLights)?;
        let on = light.on.ok_or(ElgatoError::MissingField("on"))? != 0;
        let brightness = light
            .brightness
            .ok_or(ElgatoError::MissingField("brightness"))?;
        let native = light
            .temperature
            .ok_or(ElgatoError::MissingField("temperature"))?;
        if native == 0 {
            return Err(ElgatoError::ZeroTemperature);
        }
        Ok(LightStatus {
            on,
            brightness: Brightness::clamping(i64::from(brightness)),
            temperature: ColorTemperature::clamping(i64::from(convert::native_to_kelvin(native))),
        })
    }
}
