//! MQTT intent source.
//!
//! ## Responsibilities
//!
//! - Maintain a connection to the broker, re-subscribing after every
//!   reconnect.
//! - Parse command messages under `<base>/set/<serial>/<action>` into
//!   [`ControlIntent`]s and hand them to the dispatcher channel.
//! - Drop malformed messages with a log line; a bad payload never affects
//!   the connection or other messages.
//!
//! ## Dependency rule
//!
//! Depends only on `lightbridge-domain`; the dispatcher consumes the
//! channel without knowing intents come from MQTT.

mod config;
pub mod topic;

pub use config::MqttConfig;

use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;

use lightbridge_domain::command::ControlIntent;

/// Backoff between polls after a connection error. rumqttc reconnects on
/// the next poll; this only paces the retry.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Long-lived broker connection feeding the intent channel.
pub struct MqttIntentSource {
    config: MqttConfig,
}

impl MqttIntentSource {
    #[must_use]
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    /// Connection loop — runs until the intent channel closes.
    pub async fn run(self, intents: mpsc::Sender<ControlIntent>) {
        let mut options = MqttOptions::new(
            self.config.client_id.as_str(),
            self.config.broker_host.as_str(),
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(self.config.keep_alive_secs)));
        if let Some(username) = &self.config.username {
            options.set_credentials(
                username.as_str(),
                self.config.password.clone().unwrap_or_default(),
            );
        }

        let (client, mut eventloop) = AsyncClient::new(options, 16);
        let filter = topic::subscription_filter(&self.config.base_topic);
        loop {
            match eventloop.poll().await {
                // Subscriptions do not survive a reconnect, so renew on
                // every ConnAck rather than once at startup.
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!(%filter, "connected to broker, subscribing");
                    if let Err(err) = client.subscribe(filter.as_str(), QoS::AtLeastOnce).await {
                        tracing::error!(%err, "subscribe request failed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match topic::parse_intent(
                        &self.config.base_topic,
                        &publish.topic,
                        &publish.payload,
                    ) {
                        Ok(intent) => {
                            tracing::debug!(
                                serial = %intent.serial,
                                action = intent.command.action(),
                                "intent received"
                            );
                            if intents.send(intent).await.is_err() {
                                tracing::info!("intent channel closed, stopping MQTT loop");
                                return;
                            }
                        }
                        Err(err) => {
                            tracing::warn!(topic = %publish.topic, %err, "dropping message");
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(%err, "broker connection error, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}
