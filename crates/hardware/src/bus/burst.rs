//! Burst Address Generator.
//!
//! Computes the address of the next beat of an incrementing burst. Linear bursts
//! increment the whole address and may carry into the tag; wrapping bursts only
//! increment the low `log2 k` bits modulo `k` and leave every bit above untouched.
//!
//! The cache calls [`next_address`] on every acknowledged incrementing beat so the
//! tag/data read for the following beat is issued in parallel with the `ack`.

use super::BurstType;
use crate::common::addr::low_mask;

impl BurstType {
    /// Number of low address bits that wrap, or `None` for linear bursts.
    #[inline]
    pub fn wrap_bits(self) -> Option<u32> {
        match self {
            Self::Linear => None,
            Self::Wrap4 => Some(2),
            Self::Wrap8 => Some(3),
            Self::Wrap16 => Some(4),
        }
    }

    /// Wrap length `k`, or `None` for linear bursts.
    #[inline]
    pub fn wrap_len(self) -> Option<u64> {
        self.wrap_bits().map(|bits| 1u64 << bits)
    }
}

/// Returns the address of the beat following `addr`.
///
/// # Arguments
///
/// * `addr` - Address of the current beat.
/// * `bte` - Burst type in effect.
/// * `addr_mask` - Mask of valid initiator address bits; a linear increment wraps at the top.
///
/// # Returns
///
/// The next beat's address.
#[inline]
pub fn next_address(addr: u64, bte: BurstType, addr_mask: u64) -> u64 {
    match bte.wrap_bits() {
        None => addr.wrapping_add(1) & addr_mask,
        Some(bits) => {
            let wrap = low_mask(bits);
            ((addr & !wrap) | (addr.wrapping_add(1) & wrap)) & addr_mask
        }
    }
}

/// Endless sequence of burst beat addresses starting at a given address.
#[derive(Clone, Copy, Debug)]
pub struct BurstSequence {
    next: u64,
    bte: BurstType,
    addr_mask: u64,
}

impl BurstSequence {
    /// Starts a sequence at `start`.
    pub fn new(start: u64, bte: BurstType, addr_mask: u64) -> Self {
        Self {
            next: start & addr_mask,
            bte,
            addr_mask,
        }
    }
}

impl Iterator for BurstSequence {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next;
        self.next = next_address(current, self.bte, self.addr_mask);
        Some(current)
    }
}
