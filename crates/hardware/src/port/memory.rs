//! Simulated backing store.
//!
//! `MemoryStore` serves the cache's port from a sparse map of blocks. It accepts
//! one command at a time; after the command's latency elapses it accepts the
//! write beat (applying its byte enable) or presents the read beat, then becomes
//! ready for the next command. Blocks never written read back as zeros.

use std::collections::HashMap;

use tracing::trace;

use super::controller::{LatencyModel, latency_model};
use super::{BackingStore, Command, PortResponse, ReadBeat, Transfers};
use crate::common::addr::low_mask;
use crate::common::constants::BYTE_BITS;
use crate::config::BackingStoreConfig;

#[derive(Clone, Copy, Debug)]
struct Pending {
    cmd: Command,
    wait: u64,
}

/// Sparse block memory behind a three-channel port.
#[derive(Debug)]
pub struct MemoryStore {
    line_bytes: usize,
    addr_mask: u64,
    blocks: HashMap<u64, Vec<u8>>,
    latency: Box<dyn LatencyModel>,
    pending: Option<Pending>,
    reads: u64,
    writes: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    ///
    /// # Arguments
    ///
    /// * `line_bytes` - Block size in bytes (backing-store data width / 8).
    /// * `addr_width` - Block address width; higher command address bits are ignored.
    /// * `latency` - Cycles between command acceptance and the data beat.
    pub fn new(line_bytes: usize, addr_width: u32, latency: Box<dyn LatencyModel>) -> Self {
        Self {
            line_bytes,
            addr_mask: low_mask(addr_width),
            blocks: HashMap::new(),
            latency,
            pending: None,
            reads: 0,
            writes: 0,
        }
    }

    /// Creates a store sized and timed by a backing-store configuration.
    pub fn from_config(config: &BackingStoreConfig) -> Self {
        Self::new(
            (config.data_width / BYTE_BITS) as usize,
            config.addr_width,
            latency_model(config),
        )
    }

    /// Block size in bytes.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Contents of block `addr`.
    pub fn read_block(&self, addr: u64) -> Vec<u8> {
        self.blocks
            .get(&(addr & self.addr_mask))
            .cloned()
            .unwrap_or_else(|| vec![0; self.line_bytes])
    }

    /// Stores the bytes of `data` enabled in `byte_enable` into block `addr`.
    pub fn write_block(&mut self, addr: u64, data: &[u8], byte_enable: u64) {
        let line_bytes = self.line_bytes;
        let block = self
            .blocks
            .entry(addr & self.addr_mask)
            .or_insert_with(|| vec![0; line_bytes]);
        for (i, (dst, src)) in block.iter_mut().zip(data).enumerate() {
            if byte_enable & (1 << i) != 0 {
                *dst = *src;
            }
        }
    }

    /// Reads a little-endian word of `bytes` bytes at byte `offset` of block `addr`.
    pub fn read_word(&self, addr: u64, offset: usize, bytes: usize) -> u64 {
        let block = self.read_block(addr);
        block[offset..offset + bytes]
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    /// Number of read operations served.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of write operations served.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl BackingStore for MemoryStore {
    fn respond(&mut self) -> PortResponse {
        match self.pending {
            None => PortResponse {
                cmd_ready: true,
                ..PortResponse::IDLE
            },
            Some(Pending { cmd, wait: 0 }) if cmd.we => PortResponse {
                w_ready: true,
                ..PortResponse::IDLE
            },
            Some(Pending { cmd, wait: 0 }) => PortResponse {
                r: Some(ReadBeat {
                    data: self.read_block(cmd.addr),
                }),
                ..PortResponse::IDLE
            },
            Some(_) => PortResponse::IDLE,
        }
    }

    fn clock(&mut self, transfers: &Transfers) {
        if let Some(pending) = &mut self.pending {
            pending.wait = pending.wait.saturating_sub(1);
        }
        if let (Some(w), Some(pending)) = (&transfers.w, self.pending) {
            trace!(addr = pending.cmd.addr, "store write beat");
            self.write_block(pending.cmd.addr, &w.data, w.byte_enable);
            self.writes += 1;
            self.pending = None;
        }
        if transfers.r.is_some() {
            self.reads += 1;
            self.pending = None;
        }
        if let Some(cmd) = transfers.cmd {
            let wait = self.latency.access_latency(cmd.addr & self.addr_mask);
            trace!(addr = cmd.addr, we = cmd.we, wait, "store command");
            self.pending = Some(Pending { cmd, wait });
        }
    }
}
