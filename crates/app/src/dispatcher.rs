//! Command dispatcher — resolves intents and drives the device client.
//!
//! Errors are strictly per-device: a failed intent is logged with the device
//! identity and never affects other devices or the dispatcher's ability to
//! process the next intent.

use std::sync::Arc;

use tokio::sync::mpsc;

use lightbridge_domain::command::{Command, ControlIntent};
use lightbridge_domain::device::LightStatus;
use lightbridge_domain::error::BridgeError;

use crate::ports::{DeviceClient, LightBrowser};
use crate::reconciler::Reconciler;
use crate::registry::DeviceRegistry;

/// Consumes parsed control intents and issues the matching device calls.
pub struct Dispatcher<B, C> {
    registry: Arc<DeviceRegistry>,
    client: Arc<C>,
    reconciler: Arc<Reconciler<B, C>>,
}

impl<B, C> Dispatcher<B, C>
where
    B: LightBrowser,
    C: DeviceClient,
{
    pub fn new(
        registry: Arc<DeviceRegistry>,
        client: Arc<C>,
        reconciler: Arc<Reconciler<B, C>>,
    ) -> Self {
        Self {
            registry,
            client,
            reconciler,
        }
    }

    /// Execute one intent end to end, returning the applied status.
    ///
    /// Resolution: registry lookup; on a miss, one rate-limited on-demand
    /// discovery pass and a single retry. An unresolved serial fails with
    /// [`BridgeError::UnknownDevice`] before any network call.
    ///
    /// The live status is read first so a write that would not change
    /// anything is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownDevice`] for an unresolved serial, or
    /// whatever the device client failed with.
    #[tracing::instrument(
        skip(self, intent),
        fields(serial = %intent.serial, action = intent.command.action())
    )]
    pub async fn dispatch(&self, intent: ControlIntent) -> Result<LightStatus, BridgeError> {
        let device = match self.registry.get(&intent.serial) {
            Some(device) => device,
            None => {
                self.reconciler.resolve_missing(&intent.serial).await;
                self.registry
                    .get(&intent.serial)
                    .ok_or_else(|| BridgeError::UnknownDevice(intent.serial.clone()))?
            }
        };

        let current = self.client.get_status(&device).await?;

        let applied = match intent.command {
            Command::Power(on) if current.on == on => {
                tracing::debug!("power already in commanded state, skipping write");
                current
            }
            Command::Brightness(level) if current.brightness == level => {
                tracing::debug!("brightness already at commanded level, skipping write");
                current
            }
            Command::ColorTemperature(kelvin) if current.temperature == kelvin => {
                tracing::debug!("color temperature already at commanded value, skipping write");
                current
            }
            Command::Power(on) => self.client.set_power(&device, on).await?,
            Command::Brightness(level) => self.client.set_brightness(&device, level).await?,
            Command::ColorTemperature(kelvin) => {
                self.client.set_color_temperature(&device, kelvin).await?
            }
        };

        self.registry.update_status(device.serial(), applied);
        Ok(applied)
    }

    /// Consume the intent queue until the sending side closes.
    ///
    /// Every per-intent failure is logged and swallowed; nothing that
    /// happens to one device stops the loop.
    pub async fn run(self, mut intents: mpsc::Receiver<ControlIntent>) {
        while let Some(intent) = intents.recv().await {
            let serial = intent.serial.clone();
            let action = intent.command.action();
            match self.dispatch(intent).await {
                Ok(status) => {
                    tracing::debug!(%serial, action, on = status.on, "intent applied");
                }
                Err(err) => {
                    tracing::warn!(%serial, action, %err, "intent failed");
                }
            }
        }
        tracing::info!("intent channel closed, dispatcher stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lightbridge_domain::serial::Serial;

    use crate::reconciler::ReconcilerConfig;
    use crate::test_support::{candidate, status, FakeBrowser, FakeClient};

    fn fast_config() -> ReconcilerConfig {
        ReconcilerConfig {
            browse_timeout: Duration::from_millis(10),
            retry_attempts: 1,
            retry_delay: Duration::ZERO,
            interval: Duration::from_secs(60),
            on_demand_cooldown: Duration::from_secs(10),
        }
    }

    fn dispatcher(
        client: Arc<FakeClient>,
        browser: FakeBrowser,
    ) -> (Arc<DeviceRegistry>, Dispatcher<FakeBrowser, FakeClient>) {
        let registry = Arc::new(DeviceRegistry::new());
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&registry),
            browser,
            Arc::clone(&client),
            fast_config(),
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&registry), client, reconciler);
        (registry, dispatcher)
    }

    fn power_intent(serial: &str, on: bool) -> ControlIntent {
        ControlIntent::new(Serial::new(serial), Command::power(on))
    }

    #[tokio::test]
    async fn should_apply_power_command_and_cache_status() {
        let client = Arc::new(FakeClient::default());
        client.add_device("10.0.0.5", 9123, "SN123", status(false, 20, 4000));
        let browser = FakeBrowser::returning(vec![candidate("10.0.0.5", 9123)]);
        let (registry, dispatcher) = dispatcher(Arc::clone(&client), browser);

        // Discovered via the on-demand pass triggered by the first miss.
        let applied = dispatcher.dispatch(power_intent("SN123", true)).await.unwrap();

        assert!(applied.on);
        let cached = registry.get(&Serial::new("SN123")).unwrap().status;
        assert_eq!(cached, Some(applied));
        assert_eq!(
            client.set_calls.lock().unwrap().as_slice(),
            &[(Serial::new("SN123"), "power")]
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_serial_without_network_call() {
        let client = Arc::new(FakeClient::default());
        let (_registry, dispatcher) = dispatcher(Arc::clone(&client), FakeBrowser::default());

        let result = dispatcher.dispatch(power_intent("NOPE", true)).await;

        assert!(matches!(result, Err(BridgeError::UnknownDevice(_))));
        assert_eq!(client.network_calls(), 0);
    }

    #[tokio::test]
    async fn should_skip_write_when_value_already_applied() {
        let client = Arc::new(FakeClient::default());
        client.add_device("10.0.0.5", 9123, "SN123", status(true, 20, 4000));
        let browser = FakeBrowser::returning(vec![candidate("10.0.0.5", 9123)]);
        let (registry, dispatcher) = dispatcher(Arc::clone(&client), browser);

        let applied = dispatcher.dispatch(power_intent("SN123", true)).await.unwrap();

        assert!(applied.on);
        assert!(client.set_calls.lock().unwrap().is_empty());
        // The fresh read is still cached.
        let cached = registry.get(&Serial::new("SN123")).unwrap().status;
        assert_eq!(cached, Some(status(true, 20, 4000)));
    }

    #[tokio::test]
    async fn should_dispatch_brightness_command() {
        let client = Arc::new(FakeClient::default());
        client.add_device("10.0.0.5", 9123, "SN123", status(true, 20, 4000));
        let browser = FakeBrowser::returning(vec![candidate("10.0.0.5", 9123)]);
        let (_registry, dispatcher) = dispatcher(Arc::clone(&client), browser);

        let intent = ControlIntent::new(Serial::new("SN123"), Command::brightness(80).unwrap());
        let applied = dispatcher.dispatch(intent).await.unwrap();

        assert_eq!(applied.brightness.value(), 80);
        assert_eq!(
            client.set_calls.lock().unwrap().as_slice(),
            &[(Serial::new("SN123"), "brightness")]
        );
    }

    #[tokio::test]
    async fn should_dispatch_color_temperature_command() {
        let client = Arc::new(FakeClient::default());
        client.add_device("10.0.0.5", 9123, "SN123", status(true, 20, 4000));
        let browser = FakeBrowser::returning(vec![candidate("10.0.0.5", 9123)]);
        let (_registry, dispatcher) = dispatcher(Arc::clone(&client), browser);

        let intent = ControlIntent::new(
            Serial::new("SN123"),
            Command::color_temperature(5600).unwrap(),
        );
        let applied = dispatcher.dispatch(intent).await.unwrap();

        assert_eq!(applied.temperature.kelvin(), 5600);
    }

    #[tokio::test]
    async fn should_keep_cached_status_when_device_fails_mid_command() {
        let client = Arc::new(FakeClient::default());
        client.add_device("10.0.0.5", 9123, "SN123", status(false, 20, 4000));
        let browser = FakeBrowser::returning(vec![candidate("10.0.0.5", 9123)]);
        let (registry, dispatcher) = dispatcher(Arc::clone(&client), browser);

        // Register first, then cut the device off.
        dispatcher.dispatch(power_intent("SN123", true)).await.unwrap();
        client.set_offline("SN123");

        let result = dispatcher.dispatch(power_intent("SN123", false)).await;

        assert!(matches!(result, Err(BridgeError::DeviceUnreachable(_))));
        let cached = registry.get(&Serial::new("SN123")).unwrap().status;
        assert_eq!(cached.map(|s| s.on), Some(true));
    }

    #[tokio::test]
    async fn should_process_later_intents_after_one_fails() {
        let client = Arc::new(FakeClient::default());
        client.add_device("10.0.0.5", 9123, "SN1", status(false, 20, 4000));
        client.add_device("10.0.0.6", 9123, "SN2", status(false, 20, 4000));
        let browser = FakeBrowser::returning(vec![
            candidate("10.0.0.5", 9123),
            candidate("10.0.0.6", 9123),
        ]);
        let (registry, dispatcher) = dispatcher(Arc::clone(&client), browser);
        dispatcher.reconciler.reconcile().await.unwrap();
        client.set_offline("SN1");

        let (tx, rx) = mpsc::channel(8);
        tx.send(power_intent("SN1", true)).await.unwrap();
        tx.send(power_intent("SN2", true)).await.unwrap();
        drop(tx);
        dispatcher.run(rx).await;

        let sn2 = registry.get(&Serial::new("SN2")).unwrap();
        assert_eq!(sn2.status.map(|s| s.on), Some(true));
        let sn1 = registry.get(&Serial::new("SN1")).unwrap();
        assert!(sn1.status.is_none());
    }
}
