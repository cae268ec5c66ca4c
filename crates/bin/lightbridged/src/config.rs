//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `lightbridge.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values; the `MQTT_*` names match what earlier
//! deployments of this bridge already use.

use std::time::Duration;

use serde::Deserialize;

use lightbridge_adapter_mdns::MdnsBrowser;
use lightbridge_adapter_mqtt::MqttConfig;
use lightbridge_app::health::HealthMonitorConfig;
use lightbridge_app::reconciler::ReconcilerConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// MQTT broker settings.
    pub mqtt: MqttConfig,
    /// Discovery loop settings.
    pub discovery: DiscoveryConfig,
    /// Health monitor settings.
    pub health: HealthConfig,
    /// Device client settings.
    pub device: DeviceConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Discovery loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// mDNS service type to browse for.
    pub service_type: String,
    /// Bounded wait for one browse attempt, in seconds.
    pub browse_timeout_secs: u64,
    /// Browse attempts per pass.
    pub retry_attempts: u32,
    /// Delay between browse attempts, in seconds.
    pub retry_delay_secs: u64,
    /// Interval between scheduled passes, in seconds.
    pub interval_secs: u64,
    /// Minimum spacing of on-demand passes per serial, in seconds.
    pub on_demand_cooldown_secs: u64,
}

/// Health monitor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Interval between probe sweeps, in seconds.
    pub probe_interval_secs: u64,
    /// Consecutive failures before a device is evicted.
    pub failure_threshold: u32,
}

/// Device client configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `lightbridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or a value
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("lightbridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MQTT_SERVER") {
            self.mqtt.broker_host = val;
        }
        if let Ok(val) = std::env::var("MQTT_PORT") {
            if let Ok(port) = val.parse() {
                self.mqtt.broker_port = port;
            }
        }
        if let Ok(val) = std::env::var("MQTT_USER") {
            self.mqtt.username = Some(val);
        }
        if let Ok(val) = std::env::var("MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Ok(val) = std::env::var("MQTT_BASE_TOPIC") {
            self.mqtt.base_topic = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.base_topic.is_empty() || self.mqtt.base_topic.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_topic must be non-empty and not end with '/'".to_string(),
            ));
        }
        if self.discovery.service_type.is_empty() {
            return Err(ConfigError::Validation(
                "discovery.service_type must be non-empty".to_string(),
            ));
        }
        if self.discovery.retry_attempts == 0 {
            return Err(ConfigError::Validation(
                "discovery.retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.health.failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "health.failure_threshold must be at least 1".to_string(),
            ));
        }
        if self.device.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "device.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Discovery settings in the reconciler's terms.
    #[must_use]
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            browse_timeout: Duration::from_secs(self.discovery.browse_timeout_secs),
            retry_attempts: self.discovery.retry_attempts,
            retry_delay: Duration::from_secs(self.discovery.retry_delay_secs),
            interval: Duration::from_secs(self.discovery.interval_secs),
            on_demand_cooldown: Duration::from_secs(self.discovery.on_demand_cooldown_secs),
        }
    }

    /// Health settings in the monitor's terms.
    #[must_use]
    pub fn health_config(&self) -> HealthMonitorConfig {
        HealthMonitorConfig {
            probe_interval: Duration::from_secs(self.health.probe_interval_secs),
            failure_threshold: self.health.failure_threshold,
        }
    }

    /// Per-request timeout for the device client.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.device.request_timeout_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let defaults = ReconcilerConfig::default();
        Self {
            service_type: MdnsBrowser::SERVICE_TYPE.to_string(),
            browse_timeout_secs: defaults.browse_timeout.as_secs(),
            retry_attempts: defaults.retry_attempts,
            retry_delay_secs: defaults.retry_delay.as_secs(),
            interval_secs: defaults.interval.as_secs(),
            on_demand_cooldown_secs: defaults.on_demand_cooldown.as_secs(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        let defaults = HealthMonitorConfig::default();
        Self {
            probe_interval_secs: defaults.probe_interval.as_secs(),
            failure_threshold: defaults.failure_threshold,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lightbridged=info,lightbridge=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
