//! Simulated bus initiator.
//!
//! Drives transactions into a [`Simulator`] while following the bus contract:
//! 1. **Hold until ack:** Every signal stays constant until the beat is acknowledged.
//! 2. **Idle after a cycle:** `cyc` drops for one cycle after a classic or end-of-burst ack.
//! 3. **Bursts:** Incrementing beats advance by the burst generator; the final beat is
//!    marked end-of-burst.
//! 4. **Timeout:** A beat not acknowledged within the timeout fails with [`SimError::Timeout`].

use super::simulator::Simulator;
use super::workload::Transaction;
use crate::bus::{BurstSequence, BurstType, BusRequest, CycleType};
use crate::cache::CacheGeometry;
use crate::common::SimError;
use crate::port::BackingStore;

/// Bus master driving one transaction at a time.
#[derive(Clone, Copy, Debug)]
pub struct Initiator {
    timeout: u64,
    full_sel: u8,
    addr_mask: u64,
    data_mask: u64,
}

impl Initiator {
    /// Creates an initiator for a cache of the given geometry.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Geometry of the cache being driven.
    /// * `timeout` - Cycles a beat may wait for `ack`.
    pub fn new(geometry: &CacheGeometry, timeout: u64) -> Self {
        Self {
            timeout,
            full_sel: geometry.full_sel(),
            addr_mask: geometry.layout().addr_mask(),
            data_mask: geometry.data_mask(),
        }
    }

    /// Reads one word.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if the read is not acknowledged in time.
    pub fn read<S: BackingStore>(&self, sim: &mut Simulator<S>, adr: u64) -> Result<u64, SimError> {
        let data = self.beat(sim, BusRequest::read(adr & self.addr_mask, self.full_sel))?;
        sim.idle(1)?;
        Ok(data)
    }

    /// Writes the granules of `data` selected by `sel`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if the write is not acknowledged in time.
    pub fn write<S: BackingStore>(
        &self,
        sim: &mut Simulator<S>,
        adr: u64,
        data: u64,
        sel: u8,
    ) -> Result<(), SimError> {
        let request = BusRequest::write(adr & self.addr_mask, data & self.data_mask, sel);
        let _ = self.beat(sim, request)?;
        sim.idle(1)
    }

    /// Reads `beats` words as one incrementing burst.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if any beat is not acknowledged in time.
    pub fn burst_read<S: BackingStore>(
        &self,
        sim: &mut Simulator<S>,
        start: u64,
        bte: BurstType,
        beats: usize,
    ) -> Result<Vec<u64>, SimError> {
        let mut out = Vec::with_capacity(beats);
        for (adr, cti) in self.burst(start, bte, beats) {
            let request = BusRequest::read(adr, self.full_sel).with_burst(cti, bte);
            out.push(self.beat(sim, request)?);
        }
        if beats > 0 {
            sim.idle(1)?;
        }
        Ok(out)
    }

    /// Writes `data` as one incrementing burst with every granule selected.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if any beat is not acknowledged in time.
    pub fn burst_write<S: BackingStore>(
        &self,
        sim: &mut Simulator<S>,
        start: u64,
        bte: BurstType,
        data: &[u64],
    ) -> Result<(), SimError> {
        for ((adr, cti), word) in self.burst(start, bte, data.len()).zip(data) {
            let request = BusRequest::write(adr, word & self.data_mask, self.full_sel)
                .with_burst(cti, bte);
            let _ = self.beat(sim, request)?;
        }
        if !data.is_empty() {
            sim.idle(1)?;
        }
        Ok(())
    }

    /// Runs one transaction.
    ///
    /// # Returns
    ///
    /// The data of each read beat; empty for writes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if any beat is not acknowledged in time.
    pub fn execute<S: BackingStore>(
        &self,
        sim: &mut Simulator<S>,
        transaction: &Transaction,
    ) -> Result<Vec<u64>, SimError> {
        match transaction {
            Transaction::Read { adr } => Ok(vec![self.read(sim, *adr)?]),
            Transaction::Write { adr, data, sel } => {
                self.write(sim, *adr, *data, *sel)?;
                Ok(Vec::new())
            }
            Transaction::BurstRead { adr, bte, beats } => self.burst_read(sim, *adr, *bte, *beats),
            Transaction::BurstWrite { adr, bte, data } => {
                self.burst_write(sim, *adr, *bte, data)?;
                Ok(Vec::new())
            }
        }
    }

    /// Beat addresses paired with their cycle types.
    fn burst(
        &self,
        start: u64,
        bte: BurstType,
        beats: usize,
    ) -> impl Iterator<Item = (u64, CycleType)> {
        BurstSequence::new(start, bte, self.addr_mask)
            .take(beats)
            .enumerate()
            .map(move |(i, adr)| {
                let cti = if i + 1 == beats {
                    CycleType::EndOfBurst
                } else {
                    CycleType::IncrBurst
                };
                (adr, cti)
            })
    }

    /// Holds `request` until acknowledged.
    fn beat<S: BackingStore>(
        &self,
        sim: &mut Simulator<S>,
        request: BusRequest,
    ) -> Result<u64, SimError> {
        for _ in 0..=self.timeout {
            let response = sim.tick(&request)?;
            if response.ack {
                return Ok(response.dat_r);
            }
        }
        Err(SimError::Timeout {
            addr: request.adr,
            cycles: self.timeout,
        })
    }
}
