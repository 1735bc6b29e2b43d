//! Backing-store latency models.
//!
//! This module provides:
//! 1. **FixedLatency:** Every operation waits the same number of cycles.
//! 2. **RowBufferLatency:** Row-buffer aware timing (CAS, RAS, precharge) for DRAM-style stores.
//!
//! A latency is the number of cycles between a command being accepted and its
//! data beat becoming possible.

use std::fmt::Debug;

use crate::config::{BackingStoreConfig, Controller};

/// Reports the access latency of a backing-store operation.
pub trait LatencyModel: Debug + Send + Sync {
    /// Returns the number of cycles an operation on `addr` takes.
    ///
    /// # Arguments
    ///
    /// * `addr` - Block address of the command (may be used for row-buffer modeling).
    ///
    /// # Returns
    ///
    /// Latency in cycles.
    fn access_latency(&mut self, addr: u64) -> u64;
}

/// Fixed-latency model; every operation takes the same number of cycles.
#[derive(Clone, Copy, Debug)]
pub struct FixedLatency {
    latency: u64,
}

impl FixedLatency {
    /// Creates a model with the given latency in cycles.
    pub fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl LatencyModel for FixedLatency {
    fn access_latency(&mut self, _addr: u64) -> u64 {
        self.latency
    }
}

/// DRAM-style model with one open row; hits pay CAS only.
#[derive(Clone, Copy, Debug)]
pub struct RowBufferLatency {
    open_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_bits: u32,
}

impl RowBufferLatency {
    /// Creates a model with no row open.
    ///
    /// # Arguments
    ///
    /// * `t_cas` - Column access strobe latency.
    /// * `t_ras` - Row access strobe latency.
    /// * `t_pre` - Precharge latency.
    /// * `row_bits` - Block-address bits below the row number.
    pub fn new(t_cas: u64, t_ras: u64, t_pre: u64, row_bits: u32) -> Self {
        Self {
            open_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_bits,
        }
    }
}

impl LatencyModel for RowBufferLatency {
    fn access_latency(&mut self, addr: u64) -> u64 {
        let row = addr.checked_shr(self.row_bits).unwrap_or(0);
        match self.open_row {
            Some(open) if open == row => self.t_cas,
            Some(_) => {
                self.open_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.open_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }
}

/// Builds the latency model selected by `config.controller`.
pub fn latency_model(config: &BackingStoreConfig) -> Box<dyn LatencyModel> {
    match config.controller {
        Controller::Simple => Box::new(FixedLatency::new(config.latency)),
        Controller::Dram => Box::new(RowBufferLatency::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
            config.row_bits,
        )),
    }
}
