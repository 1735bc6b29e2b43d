//! # Configuration Tests
//!
//! Defaults, JSON deserialization, file loading, and geometry validation.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;
use wbcache_core::cache::{CacheGeometry, ConstantMap};
use wbcache_core::common::{ConfigError, SimError};
use wbcache_core::config::*;

use crate::common::harness::scenario_config;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(!config.general.trace);
    assert_eq!(config.general.timeout_cycles, 256);
    assert_eq!(config.general.max_cycles, 50_000_000);
}

#[test]
fn test_cache_config_defaults() {
    let cache = CacheConfig::default();
    assert_eq!(cache.size_bytes, 4096);
    assert_eq!(cache.data_width, 32);
    assert_eq!(cache.granularity, 8);
    assert!(!cache.dirty_init);
}

#[test]
fn test_backing_config_defaults() {
    let backing = BackingStoreConfig::default();
    assert_eq!(backing.addr_width, 23);
    assert_eq!(backing.data_width, 128);
    assert_eq!(backing.controller, Controller::Simple);
    assert_eq!(backing.latency, 4);
    assert_eq!(backing.t_cas, 14);
    assert_eq!(backing.t_ras, 14);
    assert_eq!(backing.t_pre, 14);
    assert_eq!(backing.row_bits, 7);
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = Config::from_json(r#"{ "backing": { "controller": "DRAM", "t_cas": 9 } }"#).unwrap();
    assert_eq!(config.backing.controller, Controller::Dram);
    assert_eq!(config.backing.t_cas, 9);
    assert_eq!(config.backing.t_ras, 14);
    assert_eq!(config.cache.size_bytes, 4096);
}

#[test]
fn test_unknown_controller_is_rejected() {
    let err = Config::from_json(r#"{ "backing": { "controller": "Sram" } }"#).unwrap_err();
    assert!(matches!(err, SimError::Parse(_)));
}

#[test]
fn test_from_file_round_trip() {
    let mut file = NamedTempFile::new().unwrap();
    let json = serde_json::to_string(&scenario_config()).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.cache.size_bytes, 32);
    assert_eq!(config.cache.data_width, 16);
    assert_eq!(config.backing.data_width, 32);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}

// ─── Geometry ──────────────────────────────────────────────────────────────

#[test]
fn test_scenario_geometry() {
    let config = scenario_config();
    let g = CacheGeometry::new(&config.cache, &config.backing).unwrap();
    assert_eq!(g.ratio(), 2);
    assert_eq!(g.lines(), 8);
    assert_eq!(g.layout().addr_width(), 24);
    assert_eq!(g.sel_width(), 2);
    assert_eq!(g.full_sel(), 0b11);
    assert_eq!(g.full_byte_enable(), 0xF);
    assert_eq!(
        g.constant_map(),
        ConstantMap {
            size: 4 << 23,
            cache_size: 32,
        }
    );
}

fn geometry(size: usize, data: u32, gran: u32, backing: u32, addr: u32) -> Result<CacheGeometry, ConfigError> {
    let cache = CacheConfig {
        size_bytes: size,
        data_width: data,
        granularity: gran,
        dirty_init: false,
    };
    let backing = BackingStoreConfig {
        addr_width: addr,
        data_width: backing,
        ..BackingStoreConfig::default()
    };
    CacheGeometry::new(&cache, &backing)
}

#[rstest]
#[case(0, 16, 8, 32, 23, ConfigError::InvalidCacheSize(0))]
#[case(12, 16, 8, 32, 23, ConfigError::InvalidCacheSize(12))]
#[case(32, 24, 8, 48, 23, ConfigError::InvalidDataWidth(24))]
#[case(32, 128, 8, 128, 23, ConfigError::InvalidDataWidth(128))]
#[case(32, 16, 8, 40, 23, ConfigError::InvalidRatio { backing: 40, data: 16 })]
#[case(32, 16, 8, 48, 23, ConfigError::InvalidBackingWidth(48))]
#[case(4096, 64, 8, 1024, 23, ConfigError::InvalidBackingWidth(1024))]
#[case(32, 16, 4, 32, 23, ConfigError::InvalidGranularity { granularity: 4, data_width: 16 })]
#[case(32, 16, 32, 32, 23, ConfigError::InvalidGranularity { granularity: 32, data_width: 16 })]
#[case(2, 16, 8, 32, 23, ConfigError::CacheTooSmall { size: 2, line_bits: 32 })]
#[case(32, 16, 8, 32, 64, ConfigError::AddressTooWide(65))]
#[case(32, 16, 8, 32, u32::MAX, ConfigError::AddressTooWide(u32::MAX))]
#[case(1 << 62, 16, 8, 32, 23, ConfigError::CacheTooLarge(1 << 62))]
#[case(32, 16, 8, 32, 2, ConfigError::AddressTooNarrow { addr_width: 3, offset_bits: 1, line_bits: 3 })]
fn test_invalid_geometry(
    #[case] size: usize,
    #[case] data: u32,
    #[case] gran: u32,
    #[case] backing: u32,
    #[case] addr: u32,
    #[case] expected: ConfigError,
) {
    assert_eq!(geometry(size, data, gran, backing, addr), Err(expected));
}

#[test]
fn test_error_messages_name_the_offending_value() {
    assert_eq!(
        ConfigError::InvalidCacheSize(12).to_string(),
        "Cache size must be a positive power of two integer, not 12"
    );
    assert_eq!(
        ConfigError::InvalidRatio { backing: 40, data: 16 }.to_string(),
        "Backing-store data width must be a multiple of data width, but 40 is not a multiple of 16"
    );
    assert_eq!(
        ConfigError::CacheTooLarge(1 << 62).to_string(),
        "Cache size of 4611686018427387904 bytes is too large to model"
    );
}

#[test]
fn test_equal_widths_give_one_word_lines() {
    let g = geometry(64, 32, 8, 32, 10).unwrap();
    assert_eq!(g.ratio(), 1);
    assert_eq!(g.lines(), 16);
    assert_eq!(g.layout().offset_bits(), 0);
    assert_eq!(g.layout().tag_bits(), 6);
}
