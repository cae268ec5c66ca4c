//! # lightbridge-app
//!
//! Application core — the bridge's only nontrivial logic.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports): [`ports::DeviceClient`] (device control protocol) and
//!   [`ports::LightBrowser`] (service discovery)
//! - [`registry::DeviceRegistry`] — the authoritative in-memory device set
//! - [`reconciler::Reconciler`] — merges discovery snapshots into the
//!   registry, never removing entries
//! - [`dispatcher::Dispatcher`] — resolves control intents and drives the
//!   device client
//! - [`health::HealthMonitor`] — probes devices and evicts the persistently
//!   unreachable
//!
//! ## Dependency rule
//! Depends on `lightbridge-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod dispatcher;
pub mod health;
pub mod ports;
pub mod reconciler;
pub mod registry;

#[cfg(test)]
mod test_support;
