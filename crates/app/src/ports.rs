//! Port definitions (traits) implemented by adapter crates.

pub mod browser;
pub mod device_client;

pub use browser::{Candidate, LightBrowser};
pub use device_client::DeviceClient;
