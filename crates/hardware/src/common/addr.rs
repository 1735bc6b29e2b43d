//! Initiator Address Decomposition.
//!
//! This module splits initiator word addresses into the fields the cache indexes by. It provides:
//! 1. **Named Fields:** `DecodedAddr` carries `{offset, line, tag}` instead of raw bit slices.
//! 2. **Layout Validation:** `AddressLayout` checks the field widths once, at construction.
//! 3. **Backing-Store Addresses:** Concatenation of `{line, tag}` into a store block address.
//!
//! Initiator addresses count bus words, not bytes. With `R` bus words per
//! backing-store block and `N` cache lines, an address of width `W` is laid out as:
//!
//! ```text
//!  W-1                 log2 R + log2 N      log2 R         0
//! +-------------------+--------------------+---------------+
//! |        tag        |        line        |    offset     |
//! +-------------------+--------------------+---------------+
//! ```

use super::constants::MAX_ADDR_WIDTH;
use super::error::ConfigError;

/// Returns a mask with the low `bits` bits set.
#[inline(always)]
pub(crate) const fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// An initiator address split into its cache-indexing fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Bus-word index inside the backing-store block, bits `[0, log2 R)`.
    pub offset: usize,
    /// Cache line index, bits `[log2 R, log2 R + log2 N)`.
    pub line: usize,
    /// Remaining high-order bits, `[log2 R + log2 N, W)`.
    pub tag: u64,
}

/// Validated bit layout of initiator addresses.
///
/// The layout is fixed at construction; decomposition never fails afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressLayout {
    addr_width: u32,
    offset_bits: u32,
    line_bits: u32,
}

impl AddressLayout {
    /// Creates a layout for `addr_width`-bit addresses.
    ///
    /// # Arguments
    ///
    /// * `addr_width` - Total initiator address width `W`, in bits.
    /// * `ratio` - Bus words per backing-store block `R` (power of two).
    /// * `lines` - Number of cache lines `N` (power of two).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `R` or `N` is not a power of two, when the
    /// address is wider than 64 bits, or when `W < log2 R + log2 N`.
    pub fn new(addr_width: u32, ratio: usize, lines: usize) -> Result<Self, ConfigError> {
        if !ratio.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "bus words per line",
                value: ratio as u64,
            });
        }
        if !lines.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                what: "line count",
                value: lines as u64,
            });
        }
        if addr_width > MAX_ADDR_WIDTH {
            return Err(ConfigError::AddressTooWide(addr_width));
        }
        let offset_bits = ratio.trailing_zeros();
        let line_bits = lines.trailing_zeros();
        if addr_width < offset_bits + line_bits {
            return Err(ConfigError::AddressTooNarrow {
                addr_width,
                offset_bits,
                line_bits,
            });
        }
        Ok(Self {
            addr_width,
            offset_bits,
            line_bits,
        })
    }

    /// Splits an address into `{offset, line, tag}`.
    ///
    /// Bits above the address width are ignored.
    #[inline]
    pub fn decompose(&self, addr: u64) -> DecodedAddr {
        let addr = addr & self.addr_mask();
        DecodedAddr {
            offset: (addr & low_mask(self.offset_bits)) as usize,
            line: ((addr >> self.offset_bits) & low_mask(self.line_bits)) as usize,
            tag: addr.checked_shr(self.offset_bits + self.line_bits).unwrap_or(0),
        }
    }

    /// Reassembles an address from its fields.
    #[inline]
    pub fn compose(&self, fields: DecodedAddr) -> u64 {
        let tag = fields
            .tag
            .checked_shl(self.offset_bits + self.line_bits)
            .unwrap_or(0);
        let line = ((fields.line as u64) & low_mask(self.line_bits)) << self.offset_bits;
        let offset = (fields.offset as u64) & low_mask(self.offset_bits);
        (tag | line | offset) & self.addr_mask()
    }

    /// Backing-store block address `{line, tag}`, line in the low bits.
    ///
    /// # Arguments
    ///
    /// * `line` - Cache line index.
    /// * `tag` - Tag stored for (or requested at) that line.
    ///
    /// # Returns
    ///
    /// The block address presented on the backing-store command channel.
    #[inline]
    pub fn backing_addr(&self, line: usize, tag: u64) -> u64 {
        let tag = tag.checked_shl(self.line_bits).unwrap_or(0);
        (tag | ((line as u64) & low_mask(self.line_bits))) & low_mask(self.backing_addr_width())
    }

    /// Total initiator address width `W`, in bits.
    pub fn addr_width(&self) -> u32 {
        self.addr_width
    }

    /// Width of the offset field, `log2 R`.
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Width of the line field, `log2 N`.
    pub fn line_bits(&self) -> u32 {
        self.line_bits
    }

    /// Width of the tag field, `W - log2 R - log2 N`.
    pub fn tag_bits(&self) -> u32 {
        self.addr_width - self.offset_bits - self.line_bits
    }

    /// Width of a backing-store block address, `W - log2 R`.
    pub fn backing_addr_width(&self) -> u32 {
        self.addr_width - self.offset_bits
    }

    /// Mask covering every valid initiator address bit.
    pub fn addr_mask(&self) -> u64 {
        low_mask(self.addr_width)
    }

    /// Mask covering every valid tag value.
    pub fn tag_mask(&self) -> u64 {
        low_mask(self.tag_bits())
    }
}
