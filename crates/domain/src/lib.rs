//! # lightbridge-domain
//!
//! Pure domain model for the lightbridge MQTT → Elgato Key Light bridge.
//!
//! ## Responsibilities
//! - Device identity ([`serial::Serial`], case-insensitive)
//! - Validated control values ([`command::Brightness`],
//!   [`command::ColorTemperature`]) and the commands built from them
//! - Device records ([`device::Device`]) — location, static metadata,
//!   cached status, health bookkeeping
//! - Error conventions ([`error::BridgeError`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod command;
pub mod device;
pub mod error;
pub mod serial;
pub mod time;
