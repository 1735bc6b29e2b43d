//! Validated cache geometry.
//!
//! Turns a [`CacheConfig`] and a [`BackingStoreConfig`] into the derived widths the
//! controller is built from: bus words per line (`ratio`), line count, and the
//! initiator address layout. Every check happens here, once; a `CacheGeometry`
//! that exists is always consistent.

use serde::Serialize;

use crate::common::addr::{AddressLayout, low_mask};
use crate::common::constants::{BYTE_BITS, MAX_BACKING_WIDTH, MAX_BUS_WIDTH, MIN_GRANULARITY};
use crate::common::error::ConfigError;
use crate::config::{BackingStoreConfig, CacheConfig};

/// Constants an integrator exposes to software about the cached memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConstantMap {
    /// Size of the memory behind the cache, in bytes (saturating).
    pub size: u64,
    /// Cache size, in bytes.
    pub cache_size: u64,
}

/// Derived, validated geometry of one cache instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    size_bytes: usize,
    data_width: u32,
    granularity: u32,
    backing_data_width: u32,
    ratio: usize,
    lines: usize,
    layout: AddressLayout,
    dirty_init: bool,
}

impl CacheGeometry {
    /// Validates a cache configuration against the backing-store port it will drive.
    ///
    /// # Arguments
    ///
    /// * `cache` - Requested cache size, bus width, granularity, and init policy.
    /// * `backing` - Backing-store port widths.
    ///
    /// # Errors
    ///
    /// Checks run in this order and stop at the first failure:
    /// 1. [`ConfigError::InvalidCacheSize`] - size not a positive power of two.
    /// 2. [`ConfigError::InvalidDataWidth`] - bus width not a power of two of at most 64 bits.
    /// 3. [`ConfigError::InvalidRatio`] - backing width not a multiple of the bus width.
    /// 4. [`ConfigError::InvalidBackingWidth`] - backing width not a power of two of at most 512 bits.
    /// 5. [`ConfigError::InvalidGranularity`] - granularity not a power of two in `[8, data_width]`.
    /// 6. [`ConfigError::CacheTooLarge`] / [`ConfigError::CacheTooSmall`] - size beyond a
    ///    machine word of bits, or below one backing-store block.
    /// 7. [`ConfigError::AddressTooWide`] / [`ConfigError::AddressTooNarrow`] - address layout.
    pub fn new(cache: &CacheConfig, backing: &BackingStoreConfig) -> Result<Self, ConfigError> {
        let size = cache.size_bytes;
        if !size.is_power_of_two() {
            return Err(ConfigError::InvalidCacheSize(size));
        }

        let data_width = cache.data_width;
        if !data_width.is_power_of_two() || data_width > MAX_BUS_WIDTH {
            return Err(ConfigError::InvalidDataWidth(data_width));
        }

        let backing_width = backing.data_width;
        if backing_width == 0 || backing_width % data_width != 0 {
            return Err(ConfigError::InvalidRatio {
                backing: backing_width,
                data: data_width,
            });
        }
        if !backing_width.is_power_of_two() || backing_width > MAX_BACKING_WIDTH {
            return Err(ConfigError::InvalidBackingWidth(backing_width));
        }

        let granularity = cache.granularity;
        if !granularity.is_power_of_two()
            || granularity < MIN_GRANULARITY
            || granularity > data_width
        {
            return Err(ConfigError::InvalidGranularity {
                granularity,
                data_width,
            });
        }

        let lines = size
            .checked_mul(BYTE_BITS as usize)
            .ok_or(ConfigError::CacheTooLarge(size))?
            / backing_width as usize;
        if lines == 0 {
            return Err(ConfigError::CacheTooSmall {
                size,
                line_bits: backing_width,
            });
        }

        let ratio = (backing_width / data_width) as usize;
        let addr_width = backing
            .addr_width
            .checked_add(ratio.trailing_zeros())
            .ok_or(ConfigError::AddressTooWide(backing.addr_width))?;
        let layout = AddressLayout::new(addr_width, ratio, lines)?;

        Ok(Self {
            size_bytes: size,
            data_width,
            granularity,
            backing_data_width: backing_width,
            ratio,
            lines,
            layout,
            dirty_init: cache.dirty_init,
        })
    }

    /// Cache size, in bytes.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Initiator data width, in bits.
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// Initiator granularity, in bits.
    pub fn granularity(&self) -> u32 {
        self.granularity
    }

    /// Backing-store data width (one cache line), in bits.
    pub fn backing_data_width(&self) -> u32 {
        self.backing_data_width
    }

    /// Bus words per cache line.
    pub fn ratio(&self) -> usize {
        self.ratio
    }

    /// Number of cache lines.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Initiator address layout.
    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Whether lines start dirty.
    pub fn dirty_init(&self) -> bool {
        self.dirty_init
    }

    /// Bytes per bus word.
    pub fn bus_bytes(&self) -> usize {
        (self.data_width / BYTE_BITS) as usize
    }

    /// Bytes per cache line.
    pub fn line_bytes(&self) -> usize {
        (self.backing_data_width / BYTE_BITS) as usize
    }

    /// Bytes per granule.
    pub fn granule_bytes(&self) -> usize {
        (self.granularity / BYTE_BITS) as usize
    }

    /// Number of `sel` bits on the bus.
    pub fn sel_width(&self) -> u32 {
        self.data_width / self.granularity
    }

    /// `sel` with every granule selected.
    pub fn full_sel(&self) -> u8 {
        low_mask(self.sel_width()) as u8
    }

    /// Mask of the bus data bits.
    pub fn data_mask(&self) -> u64 {
        low_mask(self.data_width)
    }

    /// Full-line byte enable for the backing-store write channel.
    pub fn full_byte_enable(&self) -> u64 {
        low_mask(self.line_bytes() as u32)
    }

    /// Size constants exposed to software.
    pub fn constant_map(&self) -> ConstantMap {
        let blocks = 1u64
            .checked_shl(self.layout.backing_addr_width())
            .unwrap_or(u64::MAX);
        ConstantMap {
            size: blocks.saturating_mul(self.line_bytes() as u64),
            cache_size: self.size_bytes as u64,
        }
    }
}
