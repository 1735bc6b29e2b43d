//! Configuration system for the write-back cache model.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the model. It provides:
//! 1. **Defaults:** Baseline cache geometry, backing-store port widths, and timings.
//! 2. **Structures:** Hierarchical config for general, cache, and backing-store settings.
//! 3. **Enums:** Latency model of the simulated backing store.
//!
//! Configuration is construction-time only. It is supplied as JSON (see
//! [`Config::from_json`] and [`Config::from_file`]) or built with `Config::default()`,
//! and validated into a [`CacheGeometry`](crate::cache::CacheGeometry) before any
//! controller exists.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::SimError;
use crate::common::constants::DEFAULT_BUS_TIMEOUT;

/// Default configuration constants for the model.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in JSON configuration.
mod defaults {
    use super::DEFAULT_BUS_TIMEOUT;

    /// Default cache size in bytes (4 KiB).
    pub const CACHE_SIZE: usize = 4096;

    /// Default initiator data width in bits (32-bit bus).
    pub const DATA_WIDTH: u32 = 32;

    /// Default initiator granularity in bits (byte selects).
    pub const GRANULARITY: u32 = 8;

    /// Default backing-store block address width in bits.
    ///
    /// 2^23 blocks of 128 bits = 128 MiB behind the cache.
    pub const BACKING_ADDR_WIDTH: u32 = 23;

    /// Default backing-store data width in bits.
    ///
    /// Matches a common DRAM controller native port width.
    pub const BACKING_DATA_WIDTH: u32 = 128;

    /// Fixed access latency of the simple backing store, in cycles.
    pub const LATENCY: u64 = 4;

    /// CAS (Column Access Strobe) latency in cycles.
    pub const T_CAS: u64 = 14;

    /// RAS (Row Access Strobe) latency in cycles.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in cycles.
    pub const T_PRE: u64 = 14;

    /// Block-address bits below the DRAM row number (128 blocks per row).
    pub const ROW_BITS: u32 = 7;

    /// Cycles an initiator beat may wait for `ack`.
    pub const TIMEOUT_CYCLES: u64 = DEFAULT_BUS_TIMEOUT;

    /// Simulation cycle budget.
    pub const MAX_CYCLES: u64 = 50_000_000;
}

/// Latency model of the simulated backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Controller {
    /// Fixed latency per operation.
    #[default]
    Simple,
    /// Row-buffer aware DRAM timing (CAS, RAS, precharge).
    #[serde(alias = "DRAM")]
    Dram,
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use wbcache_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.cache.size_bytes, 4096);
/// assert_eq!(config.backing.data_width, 128);
/// ```
///
/// Deserializing from JSON; omitted fields keep their defaults:
///
/// ```
/// use wbcache_core::config::{Config, Controller};
///
/// let json = r#"{
///     "cache": { "size_bytes": 32, "data_width": 16, "dirty_init": true },
///     "backing": { "addr_width": 12, "data_width": 32, "controller": "Dram" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cache.size_bytes, 32);
/// assert_eq!(config.cache.granularity, 8);
/// assert!(config.cache.dirty_init);
/// assert_eq!(config.backing.controller, Controller::Dram);
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Harness settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Cache geometry.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Backing-store port and simulated timing.
    #[serde(default)]
    pub backing: BackingStoreConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Parse`] on malformed JSON or unknown enum values.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, or
    /// [`SimError::Parse`] if it is not a valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Harness settings: tracing and time limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Emit per-cycle trace events.
    #[serde(default)]
    pub trace: bool,

    /// Cycles an initiator beat may wait for `ack` before timing out.
    #[serde(default = "GeneralConfig::default_timeout_cycles")]
    pub timeout_cycles: u64,

    /// Total cycle budget of one simulation run.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    fn default_timeout_cycles() -> u64 {
        defaults::TIMEOUT_CYCLES
    }

    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            timeout_cycles: defaults::TIMEOUT_CYCLES,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Cache geometry as requested by the integrator.
///
/// Validated by [`CacheGeometry::new`](crate::cache::CacheGeometry::new).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Cache size in bytes; a positive power of two.
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Initiator data width in bits; a power of two, at most 64.
    #[serde(default = "CacheConfig::default_data_width")]
    pub data_width: u32,

    /// Initiator granularity in bits (width covered by one `sel` bit).
    #[serde(default = "CacheConfig::default_granularity")]
    pub granularity: u32,

    /// Start with every line dirty, for deterministic cold-start simulation.
    #[serde(default)]
    pub dirty_init: bool,
}

impl CacheConfig {
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    fn default_data_width() -> u32 {
        defaults::DATA_WIDTH
    }

    fn default_granularity() -> u32 {
        defaults::GRANULARITY
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            data_width: defaults::DATA_WIDTH,
            granularity: defaults::GRANULARITY,
            dirty_init: false,
        }
    }
}

/// Backing-store port widths and simulated timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackingStoreConfig {
    /// Block address width of the command channel, in bits.
    #[serde(default = "BackingStoreConfig::default_addr_width")]
    pub addr_width: u32,

    /// Data width of the write/read channels, in bits (one cache line).
    #[serde(default = "BackingStoreConfig::default_data_width")]
    pub data_width: u32,

    /// Latency model of the simulated store.
    #[serde(default)]
    pub controller: Controller,

    /// Fixed latency for [`Controller::Simple`], in cycles.
    #[serde(default = "BackingStoreConfig::default_latency")]
    pub latency: u64,

    /// CAS latency for [`Controller::Dram`].
    #[serde(default = "BackingStoreConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency for [`Controller::Dram`].
    #[serde(default = "BackingStoreConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency for [`Controller::Dram`].
    #[serde(default = "BackingStoreConfig::default_t_pre")]
    pub t_pre: u64,

    /// Block-address bits below the row number for [`Controller::Dram`].
    #[serde(default = "BackingStoreConfig::default_row_bits")]
    pub row_bits: u32,
}

impl BackingStoreConfig {
    fn default_addr_width() -> u32 {
        defaults::BACKING_ADDR_WIDTH
    }

    fn default_data_width() -> u32 {
        defaults::BACKING_DATA_WIDTH
    }

    fn default_latency() -> u64 {
        defaults::LATENCY
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }

    fn default_row_bits() -> u32 {
        defaults::ROW_BITS
    }
}

impl Default for BackingStoreConfig {
    fn default() -> Self {
        Self {
            addr_width: defaults::BACKING_ADDR_WIDTH,
            data_width: defaults::BACKING_DATA_WIDTH,
            controller: Controller::Simple,
            latency: defaults::LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
            row_bits: defaults::ROW_BITS,
        }
    }
}
