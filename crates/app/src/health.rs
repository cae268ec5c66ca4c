//! Health monitor — probes known devices and evicts the unreachable.
//!
//! The only component permitted to remove a device from the registry.
//! Eviction requires `failure_threshold` *consecutive* probe failures; any
//! successful contact in between resets the count.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::DeviceClient;
use crate::registry::DeviceRegistry;

/// Tunables for the probe loop.
#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    /// Interval between probe sweeps.
    pub probe_interval: Duration,
    /// Consecutive failures before a device is evicted.
    pub failure_threshold: u32,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(300),
            failure_threshold: 3,
        }
    }
}

/// Periodic reachability sweep over the registry.
pub struct HealthMonitor<C> {
    registry: Arc<DeviceRegistry>,
    client: Arc<C>,
    config: HealthMonitorConfig,
}

impl<C: DeviceClient> HealthMonitor<C> {
    pub fn new(registry: Arc<DeviceRegistry>, client: Arc<C>, config: HealthMonitorConfig) -> Self {
        Self {
            registry,
            client,
            config,
        }
    }

    /// Probe loop — never exits.
    pub async fn run(self) {
        loop {
            tokio::time::sleep(self.config.probe_interval).await;
            let evicted = self.sweep().await;
            if evicted > 0 {
                tracing::info!(evicted, "health sweep evicted unreachable devices");
            }
        }
    }

    /// Probe every registered device once, returning how many were evicted.
    ///
    /// A probe failure only affects the probed device; the sweep always
    /// visits the full snapshot.
    pub async fn sweep(&self) -> usize {
        let mut evicted = 0;
        for device in self.registry.list_all() {
            let serial = device.serial().clone();
            let reachable = self.client.probe(&device).await;
            match self.registry.record_health(&serial, reachable) {
                Some(failures) if !reachable => {
                    tracing::debug!(%serial, failures, "probe failed");
                    if failures >= self.config.failure_threshold {
                        self.registry.remove(&serial);
                        self.client.forget(&serial);
                        evicted += 1;
                        tracing::warn!(%serial, failures, "device evicted after sustained unreachability");
                    }
                }
                Some(_) => tracing::trace!(%serial, "probe ok"),
                // Removed by a concurrent sweep; nothing to record.
                None => {}
            }
        }
        evicted
    }
}
