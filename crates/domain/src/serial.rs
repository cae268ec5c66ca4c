//! Serial numbers — the stable identity of a light.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A device serial number, normalised for case-insensitive identity.
///
/// Devices report serials like `BW17J1A01234`, but discovery records and
/// MQTT topics may carry them in any case. Construction trims surrounding
/// whitespace and ASCII-uppercases the value, so equality and hashing are
/// case-insensitive everywhere a [`Serial`] is used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Serial(String);

impl Serial {
    /// Normalise a raw serial string.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// The normalised serial as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Serial {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Serial {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
