//! Global Model Constants.
//!
//! This module defines the width limits and defaults shared across the cache model. It includes:
//! 1. **Width Limits:** Upper bounds for the initiator bus and the backing-store data path.
//! 2. **Granule Constants:** The smallest addressable unit on either side of the cache.
//! 3. **Bus Constants:** Timeouts applied by the simulated initiator.

/// Widest supported initiator bus data path, in bits.
///
/// Bus words are carried in a `u64`.
pub const MAX_BUS_WIDTH: u32 = 64;

/// Widest supported backing-store data path, in bits.
///
/// A full-line byte enable must fit in a `u64` (one bit per byte).
pub const MAX_BACKING_WIDTH: u32 = 512;

/// Smallest supported write granularity, in bits.
pub const MIN_GRANULARITY: u32 = 8;

/// Number of bits in a byte.
pub const BYTE_BITS: u32 = 8;

/// Widest supported initiator address, in bits.
pub const MAX_ADDR_WIDTH: u32 = 64;

/// Cycles an initiator waits for `ack` before reporting a timeout.
///
/// Large enough to cover an eviction plus a refill against the slowest
/// default row-buffer timings.
pub const DEFAULT_BUS_TIMEOUT: u64 = 256;
