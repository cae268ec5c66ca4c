//! Validated control values and the intents built from them.
//!
//! Ranges are enforced at construction: a [`Command`] cannot hold an
//! out-of-range brightness or colour temperature, so an invalid value is
//! rejected at the parse boundary, before any registry lookup or network
//! call.

use serde::Serialize;

use crate::error::CommandError;
use crate::serial::Serial;

/// Brightness percentage, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Brightness(u8);

impl Brightness {
    pub const MAX: u8 = 100;

    /// Validate a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::BrightnessOutOfRange`] when `value` is not in
    /// `0..=100`.
    pub fn new(value: i64) -> Result<Self, CommandError> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(Self(v)),
            _ => Err(CommandError::BrightnessOutOfRange(value)),
        }
    }

    /// Saturate a device-reported value into range.
    ///
    /// Only for values read back from a light — commanded values must go
    /// through [`Brightness::new`].
    #[must_use]
    pub fn clamping(value: i64) -> Self {
        Self(u8::try_from(value.clamp(0, i64::from(Self::MAX))).unwrap_or(Self::MAX))
    }

    /// The percentage as an integer.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Colour temperature in Kelvin, `2900..=7000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    pub const MIN_KELVIN: u16 = 2900;
    pub const MAX_KELVIN: u16 = 7000;

    /// Validate a raw Kelvin value.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ColorTemperatureOutOfRange`] when `kelvin` is
    /// not in `2900..=7000`.
    pub fn new(kelvin: i64) -> Result<Self, CommandError> {
        match u16::try_from(kelvin) {
            Ok(k) if (Self::MIN_KELVIN..=Self::MAX_KELVIN).contains(&k) => Ok(Self(k)),
            _ => Err(CommandError::ColorTemperatureOutOfRange(kelvin)),
        }
    }

    /// Saturate a device-reported value into range.
    ///
    /// The native→Kelvin decoding rounds to the nearest 100K and can land
    /// just outside the commandable range; readings are clamped rather than
    /// rejected.
    #[must_use]
    pub fn clamping(kelvin: i64) -> Self {
        let clamped = kelvin.clamp(i64::from(Self::MIN_KELVIN), i64::from(Self::MAX_KELVIN));
        Self(u16::try_from(clamped).unwrap_or(Self::MAX_KELVIN))
    }

    /// The temperature in Kelvin.
    #[must_use]
    pub fn kelvin(self) -> u16 {
        self.0
    }
}

/// An abstract device command, carrying an already-validated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Power(bool),
    Brightness(Brightness),
    ColorTemperature(ColorTemperature),
}

impl Command {
    #[must_use]
    pub fn power(on: bool) -> Self {
        Self::Power(on)
    }

    /// Build a brightness command from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::BrightnessOutOfRange`] for values outside
    /// `0..=100`.
    pub fn brightness(value: i64) -> Result<Self, CommandError> {
        Brightness::new(value).map(Self::Brightness)
    }

    /// Build a colour-temperature command from a raw Kelvin value.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ColorTemperatureOutOfRange`] for values
    /// outside `2900..=7000`.
    pub fn color_temperature(kelvin: i64) -> Result<Self, CommandError> {
        ColorTemperature::new(kelvin).map(Self::ColorTemperature)
    }

    /// Short action name for logs and topics.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Power(_) => "power",
            Self::Brightness(_) => "brightness",
            Self::ColorTemperature(_) => "color",
        }
    }
}

/// A parsed control intent addressed to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlIntent {
    pub serial: Serial,
    pub command: Command,
}

impl ControlIntent {
    #[must_use]
    pub fn new(serial: Serial, command: Command) -> Self {
        Self { serial, command }
    }
}
