//! Simulator: owns the cache and its backing store side by side.
//!
//! Every cycle runs in three phases: the store drives its half of the port, the
//! cache steps on that and the initiator's request, then the adapter resolves the
//! handshakes, checks them, and clocks the store.

use tracing::{info, trace};

use super::initiator::Initiator;
use super::workload::{ShadowMemory, Transaction};
use crate::bus::{BusRequest, BusResponse};
use crate::cache::WritebackCache;
use crate::common::SimError;
use crate::config::{Config, GeneralConfig};
use crate::port::memory::MemoryStore;
use crate::port::monitor::ProtocolMonitor;
use crate::port::{BackingStore, PortAdapter};

/// Top-level simulator: cache plus backing store behind a checked port.
#[derive(Debug)]
pub struct Simulator<S = MemoryStore> {
    cache: WritebackCache,
    port: PortAdapter<S>,
    cycle: u64,
    max_cycles: u64,
    timeout_cycles: u64,
}

impl Simulator<MemoryStore> {
    /// Builds a cache and a sparse memory store from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the cache geometry is invalid.
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        let cache = WritebackCache::new(&config.cache, &config.backing)?;
        let store = MemoryStore::from_config(&config.backing);
        Ok(Self::new(cache, store, &config.general))
    }
}

impl<S: BackingStore> Simulator<S> {
    /// Connects a cache to a backing store.
    pub fn new(cache: WritebackCache, store: S, general: &GeneralConfig) -> Self {
        Self {
            cache,
            port: PortAdapter::new(store),
            cycle: 0,
            max_cycles: general.max_cycles,
            timeout_cycles: general.timeout_cycles,
        }
    }

    /// Advances the simulator by one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `bus` - Initiator signals for this cycle.
    ///
    /// # Returns
    ///
    /// The cache's initiator-side response for this cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CycleBudget`] once the budget is spent, or
    /// [`SimError::Protocol`] if the port monitor rejects the cycle.
    pub fn tick(&mut self, bus: &BusRequest) -> Result<BusResponse, SimError> {
        if self.cycle >= self.max_cycles {
            return Err(SimError::CycleBudget(self.max_cycles));
        }
        let response = self.port.drive();
        let outputs = self.cache.step(bus, &response);
        let transfers = self.port.commit(&outputs.port, response)?;
        if !transfers.is_empty() {
            trace!(cycle = self.cycle, ?transfers, "port transfers");
        }
        self.cycle += 1;
        Ok(outputs.bus)
    }

    /// Runs `cycles` cycles with the bus idle.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`tick`](Self::tick).
    pub fn idle(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            let _ = self.tick(&BusRequest::IDLE)?;
        }
        Ok(())
    }

    /// Drives a list of transactions and checks every read against the data written.
    ///
    /// Unwritten words are expected to read back as zero, which holds for a
    /// cold cache in front of a zero-filled store.
    ///
    /// # Returns
    ///
    /// The data of every read beat, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataMismatch`] on the first wrong read, or any error
    /// raised while driving the bus.
    pub fn run_workload(&mut self, transactions: &[Transaction]) -> Result<Vec<u64>, SimError> {
        let geometry = *self.cache.geometry();
        let initiator = Initiator::new(&geometry, self.timeout_cycles);
        let mut shadow = ShadowMemory::new(&geometry);
        let mut reads = Vec::new();

        for transaction in transactions {
            let observed = initiator.execute(self, transaction)?;
            shadow.check(transaction, &observed)?;
            reads.extend(observed);
        }

        info!(
            transactions = transactions.len(),
            cycles = self.cycle,
            hit_rate = self.cache.stats().hit_rate(),
            "workload complete"
        );
        Ok(reads)
    }

    /// Cycles simulated so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Cycles an initiator beat may wait for `ack`.
    pub fn timeout_cycles(&self) -> u64 {
        self.timeout_cycles
    }

    /// The cache under simulation.
    pub fn cache(&self) -> &WritebackCache {
        &self.cache
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        self.port.store()
    }

    /// The backing store, mutably; used to preload contents.
    pub fn store_mut(&mut self) -> &mut S {
        self.port.store_mut()
    }

    /// The port monitor and its log of completed operations.
    pub fn monitor(&self) -> &ProtocolMonitor {
        self.port.monitor()
    }
}
