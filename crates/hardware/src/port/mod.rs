//! Backing-Store Port.
//!
//! This module defines the three-channel contract between the cache and its
//! backing store (a DRAM controller native port or a model of one). It provides:
//! 1. **Channel Payloads:** `Command { addr, we, last }`, `WriteBeat`, `ReadBeat`.
//! 2. **Signal Halves:** `PortRequest` (cache-driven) and `PortResponse` (store-driven).
//! 3. **Adapter:** `PortAdapter` forwards both halves verbatim and resolves handshakes.
//! 4. **Models:** A sparse memory store with fixed or row-buffer latency, and a protocol monitor.
//!
//! Each channel is a ready/valid pair; a transfer happens on a cycle where both
//! are asserted. The adapter adds no buffering and no reordering.

/// Latency models for simulated backing stores.
pub mod controller;

/// Sparse simulated backing store.
pub mod memory;

/// Runtime checker for the one-operation-at-a-time contract.
pub mod monitor;

use self::monitor::ProtocolMonitor;
use crate::common::ProtocolViolation;

/// Command channel payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Command {
    /// Block address `{line, tag}`.
    pub addr: u64,
    /// Write operation; fixed for the whole operation.
    pub we: bool,
    /// Single-beat access; no further command follows as part of this operation.
    pub last: bool,
}

/// Write channel payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBeat {
    /// Full block, little-endian.
    pub data: Vec<u8>,
    /// Byte enable, one bit per byte of `data`.
    pub byte_enable: u64,
}

/// Read channel payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadBeat {
    /// Full block, little-endian.
    pub data: Vec<u8>,
}

/// Signals the cache drives towards the store. `Some` means `valid`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortRequest {
    /// Command channel (`cmd.valid` and payload).
    pub cmd: Option<Command>,
    /// Write channel (`w.valid` and payload).
    pub w: Option<WriteBeat>,
    /// Read channel `r.ready`.
    pub r_ready: bool,
}

impl PortRequest {
    /// No channel active.
    pub const IDLE: Self = Self {
        cmd: None,
        w: None,
        r_ready: false,
    };
}

/// Signals the store drives towards the cache. `Some` means `valid`.
///
/// A store decides its response from its own state only; it must not look at
/// the cache's request of the same cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortResponse {
    /// Command channel `cmd.ready`.
    pub cmd_ready: bool,
    /// Write channel `w.ready`.
    pub w_ready: bool,
    /// Read channel (`r.valid` and payload).
    pub r: Option<ReadBeat>,
}

impl PortResponse {
    /// Store not ready on any channel.
    pub const IDLE: Self = Self {
        cmd_ready: false,
        w_ready: false,
        r: None,
    };
}

/// Transfers that completed on one clock edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transfers {
    /// Command accepted by the store.
    pub cmd: Option<Command>,
    /// Write beat accepted by the store.
    pub w: Option<WriteBeat>,
    /// Read beat accepted by the cache.
    pub r: Option<ReadBeat>,
}

impl Transfers {
    /// Resolves each channel as `valid && ready`.
    pub fn resolve(request: &PortRequest, response: PortResponse) -> Self {
        Self {
            cmd: request.cmd.filter(|_| response.cmd_ready),
            w: request.w.clone().filter(|_| response.w_ready),
            r: response.r.filter(|_| request.r_ready),
        }
    }

    /// True when nothing transferred.
    pub fn is_empty(&self) -> bool {
        self.cmd.is_none() && self.w.is_none() && self.r.is_none()
    }
}

/// The store side of the port.
///
/// The cache is the only client; it respects one-operation-at-a-time, so an
/// implementation only has to serve a command, then its single data beat.
pub trait BackingStore {
    /// Drives `cmd.ready`, `w.ready`, and `r.valid`/`r.data` for the current cycle.
    fn respond(&mut self) -> PortResponse;

    /// Advances one clock edge, given the transfers that completed on it.
    fn clock(&mut self, transfers: &Transfers);
}

/// Forwards cache and store signals verbatim and resolves the handshakes.
#[derive(Debug)]
pub struct PortAdapter<S> {
    store: S,
    monitor: ProtocolMonitor,
}

impl<S: BackingStore> PortAdapter<S> {
    /// Wraps a store; the monitor starts with an empty operation log.
    pub fn new(store: S) -> Self {
        Self {
            store,
            monitor: ProtocolMonitor::new(),
        }
    }

    /// Samples the store's half of the port for the current cycle.
    pub fn drive(&mut self) -> PortResponse {
        self.store.respond()
    }

    /// Resolves this cycle's handshakes and clocks the store.
    ///
    /// # Arguments
    ///
    /// * `request` - The cache's half of the port for this cycle.
    /// * `response` - The store's half, as returned by [`drive`](Self::drive).
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolViolation`] the monitor detected, if any. The store is
    /// clocked either way.
    pub fn commit(
        &mut self,
        request: &PortRequest,
        response: PortResponse,
    ) -> Result<Transfers, ProtocolViolation> {
        let transfers = Transfers::resolve(request, response);
        let verdict = self.monitor.observe(request, &transfers);
        self.store.clock(&transfers);
        verdict.map(|()| transfers)
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The wrapped store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The protocol monitor and its log of completed operations.
    pub fn monitor(&self) -> &ProtocolMonitor {
        &self.monitor
    }
}
