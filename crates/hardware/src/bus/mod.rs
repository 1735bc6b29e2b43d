//! Initiator-Facing Bus Signals.
//!
//! This module defines the request/acknowledge handshake the cache serves. It provides:
//! 1. **Requests:** `BusRequest` carries `cyc`, `stb`, `we`, `sel`, `adr`, `dat_w`, `cti`, `bte`.
//! 2. **Responses:** `BusResponse` carries `ack` and `dat_r`.
//! 3. **Burst Extensions:** `CycleType` and `BurstType`, plus the burst address generator.
//!
//! An initiator holds every signal constant until `ack`, except when continuing an
//! incrementing burst, where the address advances per [`burst::next_address`].
//! After acknowledging a classic or end-of-burst beat the initiator drops `cyc`
//! for at least one cycle.

/// Burst continuation address generator.
pub mod burst;

pub use burst::{BurstSequence, next_address};

/// Cycle type identifier (`cti`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CycleType {
    /// Single-beat transaction.
    #[default]
    Classic,
    /// Beat of an incrementing burst; another beat follows.
    IncrBurst,
    /// Final beat of a burst.
    EndOfBurst,
}

/// Burst type extension (`bte`): how burst addresses advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BurstType {
    /// Increment the whole address.
    #[default]
    Linear,
    /// Wrap within 4-word boundaries.
    Wrap4,
    /// Wrap within 8-word boundaries.
    Wrap8,
    /// Wrap within 16-word boundaries.
    Wrap16,
}

/// Signals driven by the initiator for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusRequest {
    /// Bus cycle in progress.
    pub cyc: bool,
    /// Strobe: a valid beat is presented.
    pub stb: bool,
    /// Write enable.
    pub we: bool,
    /// Byte-select mask, one bit per granule of the bus word.
    pub sel: u8,
    /// Word address.
    pub adr: u64,
    /// Write data.
    pub dat_w: u64,
    /// Cycle type.
    pub cti: CycleType,
    /// Burst type.
    pub bte: BurstType,
}

impl BusRequest {
    /// An idle bus: `cyc` and `stb` deasserted.
    pub const IDLE: Self = Self {
        cyc: false,
        stb: false,
        we: false,
        sel: 0,
        adr: 0,
        dat_w: 0,
        cti: CycleType::Classic,
        bte: BurstType::Linear,
    };

    /// A single-beat read of `adr`.
    pub fn read(adr: u64, sel: u8) -> Self {
        Self {
            cyc: true,
            stb: true,
            sel,
            adr,
            ..Self::IDLE
        }
    }

    /// A single-beat write of `dat_w` to `adr`, touching the granules in `sel`.
    pub fn write(adr: u64, dat_w: u64, sel: u8) -> Self {
        Self {
            cyc: true,
            stb: true,
            we: true,
            sel,
            adr,
            dat_w,
            ..Self::IDLE
        }
    }

    /// Returns this request tagged as a burst beat.
    pub fn with_burst(self, cti: CycleType, bte: BurstType) -> Self {
        Self { cti, bte, ..self }
    }

    /// `cyc && stb`.
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.cyc && self.stb
    }
}

/// Signals driven by the cache for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusResponse {
    /// Beat acknowledged this cycle.
    pub ack: bool,
    /// Read data; meaningful only while `ack` is asserted on a read.
    pub dat_r: u64,
}
