//! Elgato adapter error types.

use lightbridge_domain::error::BridgeError;

/// Errors specific to the Elgato HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ElgatoError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never completed (connect failure, timeout).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with a non-success HTTP status.
    #[error("error status from {url}")]
    Status {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON.
    #[error("undecodable response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A lights response carried no light entry.
    #[error("lights response carried no light entry")]
    EmptyLights,

    /// A lights response was missing a status field.
    #[error("lights response missing field `{0}`")]
    MissingField(&'static str),

    /// A zero native colour register cannot be decoded.
    #[error("device reported native temperature 0")]
    ZeroTemperature,
}

impl ElgatoError {
    /// Classify into the bridge-wide error kinds: transport failures mean
    /// the device is unreachable, everything else is a protocol violation.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        match self {
            Self::Transport { .. } => BridgeError::DeviceUnreachable(Box::new(self)),
            other => BridgeError::DeviceProtocol(Box::new(other)),
        }
    }
}

impl From<ElgatoError> for BridgeError {
    fn from(err: ElgatoError) -> Self {
        err.into_domain()
    }
}
