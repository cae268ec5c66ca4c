//! Error conventions shared across the bridge.
//!
//! Every per-device failure is recovered at the dispatcher or health-monitor
//! boundary — logged with the device identity and surfaced as a failed
//! outcome for that single intent or probe. Nothing in this enum is fatal to
//! the control loop.

use crate::serial::Serial;

/// Boxed source error carried across an adapter boundary.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// The bridge-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Connection or timeout failure talking to a device.
    #[error("device unreachable")]
    DeviceUnreachable(#[source] SourceError),

    /// The device answered with something malformed or unexpected.
    #[error("unexpected device response")]
    DeviceProtocol(#[source] SourceError),

    /// The addressed serial is not in the registry. A normal outcome, not a
    /// network failure.
    #[error("unknown device {0}")]
    UnknownDevice(Serial),

    /// A command value outside its allowed range, rejected before any
    /// network call.
    #[error("invalid command")]
    InvalidCommand(#[from] CommandError),

    /// The discovery collaborator failed. Transient — the next scheduled
    /// pass is unaffected.
    #[error("discovery failed")]
    Discovery(#[source] SourceError),
}

/// Why a control value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Brightness must be a percentage.
    #[error("brightness {0} out of range 0..=100")]
    BrightnessOutOfRange(i64),

    /// Colour temperature must be within the hardware's Kelvin range.
    #[error("color temperature {0}K out of range 2900..=7000")]
    ColorTemperatureOutOfRange(i64),
}
