//! Direct-mapped write-back cache model.
//!
//! This crate implements a cycle-accurate model of a write-back cache that bridges a
//! burst-capable initiator bus to a three-channel memory-controller port:
//! 1. **Bus:** Initiator request/acknowledge signals with cycle-type and burst-type extensions.
//! 2. **Cache:** Address decomposition, tag/data memories, and the CHECK/EVICT/REFILL machine.
//! 3. **Port:** Command, write, and read ready/valid channels, with simulated stores and a
//!    protocol monitor.
//! 4. **Simulation:** Initiator, workloads, configuration, and statistics collection.

/// Initiator-side bus signals and burst address generation.
pub mod bus;
/// Cache geometry, memories, and the protocol state machine.
pub mod cache;
/// Common types and constants (address layout, errors, width limits).
pub mod common;
/// Model configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Backing-store port channels, stores, and protocol monitor.
pub mod port;
/// Simulator, initiator, and workloads.
pub mod sim;
/// Cache statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The cache controller; construct with `WritebackCache::new`.
pub use crate::cache::WritebackCache;
/// Top-level simulator (cache plus backing store); construct with `Simulator::from_config`.
pub use crate::sim::Simulator;
