//! Configuration, Protocol, and Simulation Errors.
//!
//! This module defines every error the crate can report. It provides:
//! 1. **Configuration Errors:** Construction-time rejection of cache and port geometries.
//! 2. **Protocol Violations:** Backing-store contract breaches found by the port monitor.
//! 3. **Simulation Errors:** Harness failures (timeouts, config loading) wrapping the above.
//!
//! The cache controller itself has no runtime error path; a built controller
//! runs indefinitely and never fails.

use thiserror::Error;

/// Construction-time configuration error.
///
/// Raised while validating a [`CacheConfig`](crate::config::CacheConfig) against a
/// [`BackingStoreConfig`](crate::config::BackingStoreConfig). A controller is never
/// built from an invalid geometry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Cache size is zero or not a power of two.
    #[error("Cache size must be a positive power of two integer, not {0}")]
    InvalidCacheSize(usize),

    /// Initiator data width is zero, not a power of two, or wider than the bus word.
    #[error("Data width must be a positive power of two integer, not {0}")]
    InvalidDataWidth(u32),

    /// Granularity is not a power of two in `[8, data_width]`.
    #[error(
        "Granularity must be a power of two between 8 and the data width ({data_width}), not {granularity}"
    )]
    InvalidGranularity {
        /// Requested granularity, in bits.
        granularity: u32,
        /// Initiator data width, in bits.
        data_width: u32,
    },

    /// Backing-store width is not a whole number of initiator words.
    #[error(
        "Backing-store data width must be a multiple of data width, but {backing} is not a multiple of {data}"
    )]
    InvalidRatio {
        /// Backing-store data width, in bits.
        backing: u32,
        /// Initiator data width, in bits.
        data: u32,
    },

    /// Backing-store width is not a power of two, or exceeds the supported maximum.
    #[error("Backing-store data width must be a power of two of at most 512 bits, not {0}")]
    InvalidBackingWidth(u32),

    /// The cache cannot hold a single backing-store block.
    #[error("Cache size of {size} bytes cannot hold one {line_bits}-bit line")]
    CacheTooSmall {
        /// Requested cache size, in bytes.
        size: usize,
        /// Backing-store block width, in bits.
        line_bits: u32,
    },

    /// The cache's bit count does not fit a machine word.
    #[error("Cache size of {0} bytes is too large to model")]
    CacheTooLarge(usize),

    /// A derived quantity that must be a power of two is not.
    #[error("{what} must be a power of two, not {value}")]
    NotPowerOfTwo {
        /// Name of the derived quantity.
        what: &'static str,
        /// Offending value.
        value: u64,
    },

    /// Initiator address does not fit a 64-bit word.
    #[error("Address width must be at most 64 bits, not {0}")]
    AddressTooWide(u32),

    /// Initiator address cannot hold the offset and line fields.
    #[error(
        "Address width {addr_width} cannot hold {offset_bits} offset bits and {line_bits} line bits"
    )]
    AddressTooNarrow {
        /// Initiator address width, in bits.
        addr_width: u32,
        /// Required offset field width.
        offset_bits: u32,
        /// Required line field width.
        line_bits: u32,
    },
}

/// Breach of the backing-store port contract.
///
/// Only the verification monitor raises these; see
/// [`ProtocolMonitor`](crate::port::monitor::ProtocolMonitor).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// A command was offered while the previous operation was still incomplete.
    #[error("cycle {cycle}: command offered while the previous operation is incomplete")]
    OverlappingCommand {
        /// Cycle at which the violation was observed.
        cycle: u64,
    },

    /// Write data was offered twice for one operation.
    #[error("cycle {cycle}: write data offered after the write beat completed")]
    DuplicateWrite {
        /// Cycle at which the violation was observed.
        cycle: u64,
    },

    /// Read data was accepted twice for one operation.
    #[error("cycle {cycle}: read channel ready after the read beat completed")]
    DuplicateRead {
        /// Cycle at which the violation was observed.
        cycle: u64,
    },

    /// A read beat completed under a write command, or vice versa.
    #[error("cycle {cycle}: {beat} beat completed under a command with we={we}")]
    MismatchedBeat {
        /// Cycle at which the violation was observed.
        cycle: u64,
        /// Which data stream completed (`"read"` or `"write"`).
        beat: &'static str,
        /// Write-enable flag of the in-flight command.
        we: bool,
    },

    /// Both a read and a write beat completed within one operation.
    #[error("cycle {cycle}: read and write beats completed within one operation")]
    MixedOperation {
        /// Cycle at which the violation was observed.
        cycle: u64,
    },
}

/// Errors reported by the simulation harness.
#[derive(Debug, Error)]
pub enum SimError {
    /// The cache or port geometry was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The controller broke the backing-store contract.
    #[error("backing-store protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// An initiator transaction was not acknowledged in time.
    #[error("transaction at {addr:#x} not acknowledged after {cycles} cycles")]
    Timeout {
        /// Initiator address of the stalled beat.
        addr: u64,
        /// Cycles waited.
        cycles: u64,
    },

    /// A read returned data other than the last value written.
    #[error("read of {addr:#x} returned {actual:#x}, expected {expected:#x}")]
    DataMismatch {
        /// Initiator address of the read.
        addr: u64,
        /// Value the shadow memory holds.
        expected: u64,
        /// Value the cache returned.
        actual: u64,
    },

    /// The simulation cycle budget ran out.
    #[error("cycle budget of {0} cycles exhausted")]
    CycleBudget(u64),

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
