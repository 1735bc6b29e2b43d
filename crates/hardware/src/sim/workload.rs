//! Synthetic initiator workloads.
//!
//! This module generates transaction streams for exercising a cache. It provides:
//! 1. **Transactions:** Single reads and writes, plus incrementing burst reads and writes.
//! 2. **Generators:** Sequential, random, and burst traffic from a seeded xorshift generator.
//! 3. **Shadow Memory:** A word-level reference model that checks every read.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bus::{BurstSequence, BurstType};
use crate::cache::CacheGeometry;
use crate::common::SimError;
use crate::common::addr::low_mask;

/// One initiator transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    /// Single-beat read.
    Read {
        /// Word address.
        adr: u64,
    },
    /// Single-beat write.
    Write {
        /// Word address.
        adr: u64,
        /// Write data.
        data: u64,
        /// Granule selects.
        sel: u8,
    },
    /// Incrementing burst read.
    BurstRead {
        /// First beat address.
        adr: u64,
        /// Address advance policy.
        bte: BurstType,
        /// Number of beats.
        beats: usize,
    },
    /// Incrementing burst write with every granule selected.
    BurstWrite {
        /// First beat address.
        adr: u64,
        /// Address advance policy.
        bte: BurstType,
        /// One word per beat.
        data: Vec<u64>,
    },
}

/// Traffic pattern of a generated workload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    /// Write then read back consecutive words, sweeping twice the cache size.
    #[default]
    Sequential,
    /// Uniform reads and partial writes over four times the cache size.
    Random,
    /// Wrapping and linear bursts, each written then read back.
    Burst,
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::Random => "random",
            Self::Burst => "burst",
        };
        f.write_str(name)
    }
}

impl FromStr for Workload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            "burst" => Ok(Self::Burst),
            other => Err(format!("unknown workload '{other}'")),
        }
    }
}

/// Xorshift64 generator; deterministic for a given seed.
#[derive(Clone, Copy, Debug)]
pub struct XorShift(u64);

impl XorShift {
    /// Seeds the generator. A zero seed is replaced, since it would stick at zero.
    pub fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    /// Next pseudo-random value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Pseudo-random value in `[0, bound)`; `bound` must be non-zero.
    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

impl Workload {
    /// Generates `count` transactions for a cache of the given geometry.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Geometry of the target cache; bounds addresses, data, and selects.
    /// * `count` - Number of transactions.
    /// * `seed` - Generator seed.
    pub fn generate(self, geometry: &CacheGeometry, count: usize, seed: u64) -> Vec<Transaction> {
        let mut rng = XorShift::new(seed);
        let addr_mask = geometry.layout().addr_mask();
        let data_mask = geometry.data_mask();
        let full_sel = geometry.full_sel();
        let cache_words = (geometry.lines() * geometry.ratio()) as u64;

        match self {
            Self::Sequential => {
                let span = (cache_words * 2).min(addr_mask.saturating_add(1)).max(1);
                (0..count as u64)
                    .map(|i| {
                        let adr = (i / 2) % span;
                        if i % 2 == 0 {
                            Transaction::Write {
                                adr,
                                data: rng.next_u64() & data_mask,
                                sel: full_sel,
                            }
                        } else {
                            Transaction::Read { adr }
                        }
                    })
                    .collect()
            }
            Self::Random => {
                let span = (cache_words * 4).min(addr_mask.saturating_add(1)).max(1);
                (0..count)
                    .map(|_| {
                        let adr = rng.below(span);
                        if rng.below(2) == 0 {
                            Transaction::Read { adr }
                        } else {
                            let sel = ((rng.next_u64() as u8) & full_sel).max(1);
                            Transaction::Write {
                                adr,
                                data: rng.next_u64() & data_mask,
                                sel,
                            }
                        }
                    })
                    .collect()
            }
            Self::Burst => {
                const KINDS: [BurstType; 4] = [
                    BurstType::Linear,
                    BurstType::Wrap4,
                    BurstType::Wrap8,
                    BurstType::Wrap16,
                ];
                let span = (cache_words * 4).min(addr_mask.saturating_add(1)).max(1);
                let mut out = Vec::with_capacity(count);
                while out.len() < count {
                    let bte = KINDS[rng.below(KINDS.len() as u64) as usize];
                    let beats = bte.wrap_len().unwrap_or(4) as usize;
                    let adr = rng.below(span);
                    let data = (0..beats).map(|_| rng.next_u64() & data_mask).collect();
                    out.push(Transaction::BurstWrite { adr, bte, data });
                    if out.len() < count {
                        out.push(Transaction::BurstRead { adr, bte, beats });
                    }
                }
                out
            }
        }
    }
}

/// Word-level reference memory used to check read data.
#[derive(Clone, Debug)]
pub struct ShadowMemory {
    words: HashMap<u64, u64>,
    addr_mask: u64,
    data_mask: u64,
    granularity: u32,
    sel_width: u32,
}

impl ShadowMemory {
    /// Creates an all-zero shadow of the cached address space.
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            words: HashMap::new(),
            addr_mask: geometry.layout().addr_mask(),
            data_mask: geometry.data_mask(),
            granularity: geometry.granularity(),
            sel_width: geometry.sel_width(),
        }
    }

    /// Current value of word `adr`.
    pub fn read(&self, adr: u64) -> u64 {
        self.words.get(&(adr & self.addr_mask)).copied().unwrap_or(0)
    }

    /// Merges the granules of `data` selected by `sel` into word `adr`.
    pub fn write(&mut self, adr: u64, data: u64, sel: u8) {
        let mut keep = 0u64;
        for g in 0..self.sel_width {
            if sel & (1 << g) != 0 {
                keep |= low_mask(self.granularity) << (g * self.granularity);
            }
        }
        let word = self.words.entry(adr & self.addr_mask).or_insert(0);
        *word = ((*word & !keep) | (data & keep)) & self.data_mask;
    }

    /// Applies a transaction and compares the data it read.
    ///
    /// # Arguments
    ///
    /// * `transaction` - Transaction that was executed.
    /// * `observed` - Read data it returned, one word per read beat.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DataMismatch`] for the first word that differs.
    pub fn check(&mut self, transaction: &Transaction, observed: &[u64]) -> Result<(), SimError> {
        let full_sel = low_mask(self.sel_width) as u8;
        match transaction {
            Transaction::Read { adr } => self.expect(*adr, observed.first().copied().unwrap_or(0)),
            Transaction::Write { adr, data, sel } => {
                self.write(*adr, *data, *sel);
                Ok(())
            }
            Transaction::BurstRead { adr, bte, beats } => BurstSequence::new(*adr, *bte, self.addr_mask)
                .take(*beats)
                .enumerate()
                .try_for_each(|(i, a)| self.expect(a, observed.get(i).copied().unwrap_or(0))),
            Transaction::BurstWrite { adr, bte, data } => {
                for (a, word) in BurstSequence::new(*adr, *bte, self.addr_mask).zip(data) {
                    self.write(a, *word, full_sel);
                }
                Ok(())
            }
        }
    }

    fn expect(&self, adr: u64, actual: u64) -> Result<(), SimError> {
        let expected = self.read(adr);
        if actual == expected {
            Ok(())
        } else {
            Err(SimError::DataMismatch {
                addr: adr & self.addr_mask,
                expected,
                actual,
            })
        }
    }
}
