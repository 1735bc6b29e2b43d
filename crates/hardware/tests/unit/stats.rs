//! # Statistics Tests
//!
//! Counter accounting across hits, misses, and bursts, plus serialization.

use wbcache_core::bus::BurstType;
use wbcache_core::stats::CacheStats;

use crate::common::harness::TestContext;

#[test]
fn test_counters_start_at_zero() {
    let stats = CacheStats::default();
    assert_eq!(stats.cycles, 0);
    assert_eq!(stats.acks(), 0);
    assert_eq!(stats.hit_rate(), 0.0);
}

#[test]
fn test_cycles_track_simulator() {
    let mut ctx = TestContext::default();
    let _ = ctx.read(0x3);
    ctx.sim.idle(5).unwrap();
    assert_eq!(ctx.sim.cache().stats().cycles, ctx.sim.cycle());
}

#[test]
fn test_read_burst_over_resident_lines_is_all_hits() {
    let mut ctx = TestContext::default();
    ctx.burst_write(0x0, BurstType::Linear, &[1, 2, 3, 4]);
    let before = ctx.sim.cache().stats().clone();

    let _ = ctx.burst_read(0x0, BurstType::Linear, 4);
    let after = ctx.sim.cache().stats();
    assert_eq!(after.read_hits - before.read_hits, 4);
    assert_eq!(after.misses, before.misses);
}

#[test]
fn test_stats_serialize_to_json() {
    let mut ctx = TestContext::default();
    ctx.write(0x8, 0x1);
    let json = serde_json::to_value(ctx.sim.cache().stats()).unwrap();
    assert_eq!(json["misses"], 1);
    assert_eq!(json["write_retries"], 1);
    assert!(json.get("start_time").is_none());
}
