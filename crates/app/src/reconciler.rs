//! Discovery reconciler — merges browse snapshots into the registry.
//!
//! Discovery is best-effort and unreliable: a browse can miss devices that
//! are perfectly healthy. The reconciler therefore only ever adds or updates
//! registry entries; removal is the health monitor's job, so a slow or
//! partial discovery run can never evict a live device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use lightbridge_domain::error::BridgeError;
use lightbridge_domain::serial::Serial;

use crate::ports::{Candidate, DeviceClient, LightBrowser};
use crate::registry::DeviceRegistry;

/// Tunables for the discovery loop.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Bounded wait for a single browse attempt.
    pub browse_timeout: Duration,
    /// Browse attempts per reconciliation pass.
    pub retry_attempts: u32,
    /// Fixed delay between browse attempts.
    pub retry_delay: Duration,
    /// Interval between scheduled passes.
    pub interval: Duration,
    /// Minimum spacing of on-demand passes per unresolved serial.
    pub on_demand_cooldown: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            browse_timeout: Duration::from_secs(3),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            interval: Duration::from_secs(60),
            on_demand_cooldown: Duration::from_secs(10),
        }
    }
}

/// Periodic and on-demand discovery-to-registry reconciliation.
pub struct Reconciler<B, C> {
    registry: Arc<DeviceRegistry>,
    browser: B,
    client: Arc<C>,
    config: ReconcilerConfig,
    /// When each unresolved serial last triggered an on-demand pass.
    cooldowns: Mutex<HashMap<Serial, Instant>>,
}

impl<B, C> Reconciler<B, C>
where
    B: LightBrowser,
    C: DeviceClient,
{
    pub fn new(
        registry: Arc<DeviceRegistry>,
        browser: B,
        client: Arc<C>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            registry,
            browser,
            client,
            config,
            cooldowns: Mutex::new(HashMap::new()),
        }
    }

    /// Scheduled loop — reconcile immediately, then every interval.
    ///
    /// Discovery failures are logged and deferred to the next pass; the loop
    /// never exits.
    pub async fn run(self: Arc<Self>) {
        loop {
            if let Err(err) = self.reconcile().await {
                tracing::warn!(%err, "discovery pass failed, retrying next interval");
            }
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// One reconciliation pass: browse (with bounded retry) and merge every
    /// candidate. Per-candidate failures are logged and skipped; the
    /// registry is never mutated on a failed browse.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Discovery`] when every browse attempt failed.
    pub async fn reconcile(&self) -> Result<(), BridgeError> {
        let candidates = self.browse_with_retry().await?;
        tracing::debug!(count = candidates.len(), "discovery snapshot collected");
        for candidate in candidates {
            self.merge_candidate(candidate).await;
        }
        Ok(())
    }

    /// Browse with the configured attempt budget and fixed delay.
    ///
    /// An empty result is retried like a failure (lights answer mDNS lazily)
    /// but an exhausted budget with at least one clean-but-empty attempt is
    /// an empty snapshot, not an error — an empty network is not a failure.
    async fn browse_with_retry(&self) -> Result<Vec<Candidate>, BridgeError> {
        let mut last_err = None;
        let mut saw_empty = false;

        for attempt in 1..=self.config.retry_attempts {
            match self.browser.browse(self.config.browse_timeout).await {
                Ok(candidates) if !candidates.is_empty() => return Ok(candidates),
                Ok(_) => {
                    tracing::debug!(attempt, "browse returned no candidates");
                    saw_empty = true;
                }
                Err(err) => {
                    tracing::warn!(attempt, %err, "browse attempt failed");
                    last_err = Some(err);
                }
            }
            if attempt < self.config.retry_attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        match (saw_empty, last_err) {
            (false, Some(err)) => Err(err),
            _ => Ok(Vec::new()),
        }
    }

    /// Merge one candidate into the registry.
    ///
    /// Identity comes from the device itself: every candidate is described,
    /// and only the answered serial decides what happens. A serial already
    /// registered at this exact location is left untouched (idempotent
    /// merge); the same location may also be answered by different hardware
    /// after a DHCP lease reuse, in which case the new serial is registered.
    /// A candidate that won't describe itself is discarded rather than
    /// half-registered.
    async fn merge_candidate(&self, candidate: Candidate) {
        let info = match self.client.describe(candidate.address, candidate.port).await {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(
                    address = %candidate.address,
                    port = candidate.port,
                    %err,
                    "discarding candidate, metadata fetch failed"
                );
                return;
            }
        };

        let serial = info.serial.clone();
        match self.registry.get(&serial) {
            Some(known) if known.location() == (candidate.address, candidate.port) => {
                tracing::trace!(%serial, "candidate already registered at this location");
            }
            Some(_) => {
                self.registry.upsert(info, candidate.address, candidate.port);
                tracing::info!(
                    %serial,
                    address = %candidate.address,
                    port = candidate.port,
                    "device relocated"
                );
            }
            None => {
                self.registry.upsert(info, candidate.address, candidate.port);
                tracing::info!(
                    %serial,
                    address = %candidate.address,
                    port = candidate.port,
                    "device registered"
                );
            }
        }
    }

    /// On-demand pass for a serial the dispatcher could not resolve.
    ///
    /// Rate-limited per serial so a flood of commands for a nonexistent
    /// device cannot hammer discovery. Returns whether a pass actually ran.
    pub async fn resolve_missing(&self, serial: &Serial) -> bool {
        if !self.claim_cooldown(serial) {
            tracing::debug!(%serial, "on-demand discovery suppressed by cooldown");
            return false;
        }
        tracing::info!(%serial, "on-demand discovery for unresolved serial");
        if let Err(err) = self.reconcile().await {
            tracing::warn!(%serial, %err, "on-demand discovery failed");
        }
        true
    }

    /// Check and stamp the per-serial cooldown. Expired stamps are pruned so
    /// the map stays bounded by recently requested serials.
    fn claim_cooldown(&self, serial: &Serial) -> bool {
        let mut cooldowns = self
            .cooldowns
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        cooldowns.retain(|_, stamp| now.duration_since(*stamp) < self.config.on_demand_cooldown);
        if cooldowns.contains_key(serial) {
            return false;
        }
        cooldowns.insert(serial.clone(), now);
        true
    }
}
