//! # Unit Components
//!
//! This module organizes the tests of each cache model component, from the
//! address and burst arithmetic up to full simulated transactions.




/// Configuration defaults, JSON loading, and geometry validation.
pub mod config;

/// Backing-store port adapter, memory store, latency models, and monitor.
pub mod port;

/// Randomized coherency and protocol properties.
pub mod properties;


/// Statistics accounting.
pub mod stats;
