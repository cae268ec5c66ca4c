//! Command topic scheme.
//!
//! Every command topic is `<base>/set/<serial>/<action>` where `action` is
//! `power` (payload `on`/`off`), `brightness` (payload `0..=100`) or
//! `color` (payload Kelvin, `2900..=7000`). A malformed topic or payload
//! rejects that one message; it never tears down the connection.

use lightbridge_domain::command::{Command, ControlIntent};
use lightbridge_domain::error::CommandError;
use lightbridge_domain::serial::Serial;

/// Subscription filter matching every command topic under `base`.
#[must_use]
pub fn subscription_filter(base: &str) -> String {
    format!("{base}/set/+/+")
}

/// Why an incoming message was dropped.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntentParseError {
    /// The topic does not follow `<base>/set/<serial>/<action>`.
    #[error("topic `{0}` does not match <base>/set/<serial>/<action>")]
    TopicShape(String),

    /// The action segment names no known command.
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// The payload is not UTF-8 text.
    #[error("payload is not valid UTF-8")]
    PayloadEncoding,

    /// The payload does not parse for the given action.
    #[error("payload `{payload}` is not valid for `{action}`")]
    PayloadValue {
        action: &'static str,
        payload: String,
    },

    /// The payload parsed but the value is out of range.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Parse one incoming message into a [`ControlIntent`].
///
/// # Errors
///
/// Returns [`IntentParseError`] describing why the message was dropped.
pub fn parse_intent(
    base: &str,
    topic: &str,
    payload: &[u8],
) -> Result<ControlIntent, IntentParseError> {
    let bad_topic = || IntentParseError::TopicShape(topic.to_string());
    let rest = topic
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix("/set/"))
        .ok_or_else(bad_topic)?;
    let (serial, action) = rest.split_once('/').ok_or_else(bad_topic)?;
    if serial.is_empty() || action.is_empty() || action.contains('/') {
        return Err(bad_topic());
    }

    let payload = str::from_utf8(payload)
        .map_err(|_| IntentParseError::PayloadEncoding)?
        .trim();

    let command = match action {
        "power" => match payload {
            "on" => Command::power(true),
            "off" => Command::power(false),
            other => {
                return Err(IntentParseError::PayloadValue {
                    action: "power",
                    payload: other.to_string(),
                });
            }
        },
        "brightness" => {
            let value = payload
                .parse::<i64>()
                .map_err(|_| IntentParseError::PayloadValue {
                    action: "brightness",
                    payload: payload.to_string(),
                })?;
            Command::brightness(value)?
        }
        "color" => {
            let kelvin = payload
                .parse::<i64>()
                .map_err(|_| IntentParseError::PayloadValue {
                    action: "color",
                    payload: payload.to_string(),
                })?;
            Command::color_temperature(kelvin)?
        }
        other => return Err(IntentParseError::UnknownAction(other.to_string())),
    };

    Ok(ControlIntent::new(Serial::new(serial), command))
}
