//! # lightbridged — MQTT to Elgato Key Light bridge daemon
//!
//! Composition root that wires the adapters together and starts the bridge.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Construct the device client, mDNS browser, and MQTT intent source
//! - Construct the registry, reconciler, dispatcher, and health monitor
//! - Run an initial discovery pass, then spawn the long-lived loops
//! - Handle shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use lightbridge_adapter_elgato::ElgatoClient;
use lightbridge_adapter_mdns::MdnsBrowser;
use lightbridge_adapter_mqtt::MqttIntentSource;
use lightbridge_app::dispatcher::Dispatcher;
use lightbridge_app::health::HealthMonitor;
use lightbridge_app::reconciler::Reconciler;
use lightbridge_app::registry::DeviceRegistry;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let registry = Arc::new(DeviceRegistry::new());
    let client = Arc::new(ElgatoClient::new(config.request_timeout())?);
    let browser = MdnsBrowser::with_service_type(config.discovery.service_type.as_str());

    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&registry),
        browser,
        Arc::clone(&client),
        config.reconciler_config(),
    ));
    let monitor = HealthMonitor::new(
        Arc::clone(&registry),
        Arc::clone(&client),
        config.health_config(),
    );
    let dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&client),
        Arc::clone(&reconciler),
    );

    tracing::info!(
        broker = %config.mqtt.broker_host,
        port = config.mqtt.broker_port,
        base_topic = %config.mqtt.base_topic,
        "starting lightbridged"
    );

    // The Reconciler::run loop starts with an immediate pass, so devices
    // known at startup are registered before the first intent arrives.
    let (intents_tx, intents_rx) = mpsc::channel(32);
    let source = MqttIntentSource::new(config.mqtt);

    tokio::spawn(Arc::clone(&reconciler).run());
    tokio::spawn(monitor.run());
    tokio::spawn(dispatcher.run(intents_rx));
    tokio::spawn(source.run(intents_tx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
