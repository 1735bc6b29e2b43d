//! Direct-Mapped Write-Back Cache Controller.
//!
//! This module implements the protocol machine sitting between the initiator bus
//! and the backing-store port. It provides:
//! 1. **CHECK:** Compares last cycle's tag read against the held request; acknowledges hits
//!    one cycle after presentation, commits hit writes in the same cycle, and prefetches the
//!    next line of an incrementing burst.
//! 2. **EVICT:** Writes a dirty victim line back as one command plus one full-line beat.
//! 3. **REFILL:** Fetches the requested line as one command plus one read beat and installs it clean.
//!
//! The controller is a pure cycle function. [`WritebackCache::step`] takes this
//! cycle's bus request and store response, derives every output from registered
//! state and those inputs, then applies the clock edge. Nothing inside it can fail
//! at runtime; every check happens when the [`CacheGeometry`] is built.
//!
//! The tag and data read ports are registered, so the controller remembers which
//! line they hold and whether that line has been written since it was loaded. A
//! compare is only acted on when the loaded copy is current for the requested
//! line; otherwise the line is re-read. A write whose tag matches may still use a
//! copy that a hit write has made stale, since it needs neither the data nor the
//! dirty bit.

/// Protocol states and per-operation completion flags.
pub mod fsm;

/// Construction-time geometry validation.
pub mod geometry;

/// Tag and data memories.
pub mod store;

pub use self::geometry::{CacheGeometry, ConstantMap};

use tracing::{debug, trace};

use self::fsm::{CacheState, EvictProgress, RefillProgress};
use self::store::{CacheLine, DataMemory, DataWrite, TagEntry, TagMemory};
use crate::bus::{BusRequest, BusResponse, CycleType, next_address};
use crate::common::ConfigError;
use crate::config::{BackingStoreConfig, CacheConfig};
use crate::port::{Command, PortRequest, PortResponse, Transfers, WriteBeat};
use crate::stats::CacheStats;

/// Everything the controller drives during one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleOutputs {
    /// Initiator side: `ack` and `dat_r`.
    pub bus: BusResponse,
    /// Backing-store side: command, write beat, and read ready.
    pub port: PortRequest,
}

/// Transaction intent sampled at the last CHECK edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Registered {
    cyc: bool,
    stb: bool,
    adr: u64,
}

impl Registered {
    fn is_active(self) -> bool {
        self.cyc && self.stb
    }
}

/// What happened during a cycle, for statistics.
#[derive(Clone, Copy, Debug, Default)]
struct Activity {
    ack_read: bool,
    ack_write: bool,
    miss: bool,
    reread: bool,
    evicted: bool,
    refilled: bool,
}

/// One cycle's outputs plus the register and memory updates of its closing edge.
#[derive(Debug)]
struct Plan {
    outputs: CycleOutputs,
    state: CacheState,
    registered: Registered,
    rd_line: usize,
    rd_stale: bool,
    read: Option<usize>,
    tag_write: Option<(usize, TagEntry)>,
    data_write: Option<(usize, Vec<u8>, u64)>,
    transfers: Transfers,
    activity: Activity,
}

/// A direct-mapped write-back cache with one line-resolution pipeline.
#[derive(Debug)]
pub struct WritebackCache {
    geometry: CacheGeometry,
    state: CacheState,
    registered: Registered,
    rd_line: usize,
    rd_stale: bool,
    retrying: bool,
    tags: TagMemory,
    data: DataMemory,
    stats: CacheStats,
}

impl WritebackCache {
    /// Validates the configuration and builds a cold cache.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by [`CacheGeometry::new`].
    pub fn new(cache: &CacheConfig, backing: &BackingStoreConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_geometry(CacheGeometry::new(cache, backing)?))
    }

    /// Builds a cold cache from an already validated geometry.
    ///
    /// Every line holds the all-ones tag with `dirty = dirty_init`; data is zeroed.
    pub fn from_geometry(geometry: CacheGeometry) -> Self {
        let init = TagEntry {
            tag: geometry.layout().tag_mask(),
            dirty: geometry.dirty_init(),
        };
        Self {
            tags: TagMemory::new(geometry.lines(), init),
            data: DataMemory::new(
                geometry.lines(),
                geometry.line_bytes(),
                geometry.granule_bytes(),
            ),
            geometry,
            state: CacheState::Check,
            registered: Registered::default(),
            rd_line: 0,
            rd_stale: false,
            retrying: false,
            stats: CacheStats::default(),
        }
    }

    /// Runs one clock cycle.
    ///
    /// # Arguments
    ///
    /// * `bus` - Initiator signals for this cycle.
    /// * `port` - Backing-store signals for this cycle; they must not depend on
    ///   the returned outputs.
    ///
    /// # Returns
    ///
    /// The signals the cache drives during this cycle. Handshakes on the port
    /// complete where these outputs and `port` both assert.
    pub fn step(&mut self, bus: &BusRequest, port: &PortResponse) -> CycleOutputs {
        let plan = self.plan(bus, port);
        self.apply(plan)
    }

    fn plan(&self, bus: &BusRequest, port: &PortResponse) -> Plan {
        match self.state {
            CacheState::Check => self.plan_check(bus),
            CacheState::Evict(progress) => self.plan_evict(progress, port),
            CacheState::Refill(progress) => self.plan_refill(progress, port),
        }
    }

    fn hold(&self, outputs: CycleOutputs, state: CacheState) -> Plan {
        Plan {
            outputs,
            state,
            registered: self.registered,
            rd_line: self.rd_line,
            rd_stale: self.rd_stale,
            read: None,
            tag_write: None,
            data_write: None,
            transfers: Transfers::default(),
            activity: Activity::default(),
        }
    }

    fn plan_check(&self, bus: &BusRequest) -> Plan {
        let layout = self.geometry.layout();
        let adr = layout.decompose(bus.adr);
        let stored = self.tags.read_data();

        let active = bus.is_active();
        let prev_active = self.registered.is_active();
        let tag_match = stored.tag == adr.tag;
        let fresh_line = self.rd_line == adr.line;
        let usable = fresh_line && (!self.rd_stale || (bus.we && tag_match));

        let ack = active && prev_active && usable && tag_match;
        let miss = active && prev_active && fresh_line && !self.rd_stale && !tag_match;

        let read_enable = active && (!prev_active || ack || !usable);
        let read_line = if ack && bus.cti == CycleType::IncrBurst {
            let next = next_address(bus.adr, bus.bte, layout.addr_mask());
            layout.decompose(next).line
        } else {
            adr.line
        };

        let outputs = CycleOutputs {
            bus: BusResponse {
                ack,
                dat_r: if ack { self.read_word(adr.offset) } else { 0 },
            },
            port: PortRequest::IDLE,
        };

        let (tag_write, data_write) = if ack && bus.we {
            let mask = u64::from(bus.sel & self.geometry.full_sel())
                << (adr.offset as u32 * self.geometry.sel_width());
            (
                Some((
                    adr.line,
                    TagEntry {
                        tag: adr.tag,
                        dirty: true,
                    },
                )),
                Some((adr.line, self.replicate(bus.dat_w), mask)),
            )
        } else {
            (None, None)
        };

        let written = data_write.as_ref().map(|(line, _, _)| *line);
        let (rd_line, rd_stale) = if read_enable {
            (read_line, written == Some(read_line))
        } else {
            (self.rd_line, self.rd_stale || written == Some(self.rd_line))
        };

        let (state, registered) = if miss {
            let next = if stored.dirty {
                CacheState::Evict(EvictProgress::default())
            } else {
                CacheState::Refill(RefillProgress::default())
            };
            let cleared = Registered {
                cyc: false,
                stb: false,
                adr: bus.adr,
            };
            (next, cleared)
        } else {
            let sampled = Registered {
                cyc: bus.cyc,
                stb: bus.stb,
                adr: bus.adr,
            };
            (CacheState::Check, sampled)
        };

        Plan {
            outputs,
            state,
            registered,
            rd_line,
            rd_stale,
            read: read_enable.then_some(read_line),
            tag_write,
            data_write,
            transfers: Transfers::default(),
            activity: Activity {
                ack_read: ack && !bus.we,
                ack_write: ack && bus.we,
                miss,
                reread: prev_active && read_enable && !ack,
                ..Activity::default()
            },
        }
    }

    fn plan_evict(&self, progress: EvictProgress, port: &PortResponse) -> Plan {
        if progress.is_done() {
            return self.hold(
                CycleOutputs::default(),
                CacheState::Refill(RefillProgress::default()),
            );
        }

        let layout = self.geometry.layout();
        let line = layout.decompose(self.registered.adr).line;
        let victim = self.tags.read_data();
        let request = PortRequest {
            cmd: (!progress.cmd).then_some(Command {
                addr: layout.backing_addr(line, victim.tag),
                we: true,
                last: false,
            }),
            w: (!progress.w).then(|| WriteBeat {
                data: self.data.read_data().to_vec(),
                byte_enable: self.geometry.full_byte_enable(),
            }),
            r_ready: false,
        };
        let transfers = Transfers::resolve(&request, port.clone());
        let next = EvictProgress {
            cmd: progress.cmd || transfers.cmd.is_some(),
            w: progress.w || transfers.w.is_some(),
        };

        let mut plan = self.hold(
            CycleOutputs {
                bus: BusResponse::default(),
                port: request,
            },
            CacheState::Evict(next),
        );
        plan.activity.evicted = transfers.w.is_some();
        plan.transfers = transfers;
        plan
    }

    fn plan_refill(&self, progress: RefillProgress, port: &PortResponse) -> Plan {
        if progress.is_done() {
            return self.hold(CycleOutputs::default(), CacheState::Check);
        }

        let layout = self.geometry.layout();
        let adr = layout.decompose(self.registered.adr);
        let request = PortRequest {
            cmd: (!progress.cmd).then_some(Command {
                addr: layout.backing_addr(adr.line, adr.tag),
                we: false,
                last: true,
            }),
            w: None,
            r_ready: !progress.r,
        };
        let transfers = Transfers::resolve(&request, port.clone());
        let next = RefillProgress {
            cmd: progress.cmd || transfers.cmd.is_some(),
            r: progress.r || transfers.r.is_some(),
        };

        let mut plan = self.hold(
            CycleOutputs {
                bus: BusResponse::default(),
                port: request,
            },
            CacheState::Refill(next),
        );
        if let Some(beat) = &transfers.r {
            let mut block = beat.data.clone();
            block.resize(self.geometry.line_bytes(), 0);
            plan.tag_write = Some((
                adr.line,
                TagEntry {
                    tag: adr.tag,
                    dirty: false,
                },
            ));
            plan.data_write = Some((adr.line, block, self.data.full_mask()));
            plan.rd_stale = self.rd_stale || adr.line == self.rd_line;
            plan.activity.refilled = true;
        }
        plan.transfers = transfers;
        plan
    }

    fn apply(&mut self, plan: Plan) -> CycleOutputs {
        let Plan {
            outputs,
            state,
            registered,
            rd_line,
            rd_stale,
            read,
            tag_write,
            data_write,
            transfers,
            activity,
        } = plan;

        trace!(
            cycle = self.stats.cycles,
            state = self.state.name(),
            ack = outputs.bus.ack,
            cmd = outputs.port.cmd.is_some(),
            w = outputs.port.w.is_some(),
            r_ready = outputs.port.r_ready,
            "cycle"
        );

        self.tags.clock(read, tag_write);
        self.data.clock(
            read,
            data_write
                .as_ref()
                .map(|(line, data, mask)| DataWrite {
                    line: *line,
                    data: data.as_slice(),
                    mask: *mask,
                }),
        );

        if state.name() != self.state.name() {
            let line = self.geometry.layout().decompose(registered.adr).line;
            debug!(
                cycle = self.stats.cycles,
                from = self.state.name(),
                to = state.name(),
                line,
                "state transition"
            );
        }

        self.record(&activity, &transfers);
        self.state = state;
        self.registered = registered;
        self.rd_line = rd_line;
        self.rd_stale = rd_stale;
        outputs
    }

    fn record(&mut self, activity: &Activity, transfers: &Transfers) {
        let stats = &mut self.stats;
        stats.cycles += 1;
        if self.state.is_stalled() {
            stats.stall_cycles += 1;
        }
        if activity.ack_read || activity.ack_write {
            match (activity.ack_write, self.retrying) {
                (false, false) => stats.read_hits += 1,
                (true, false) => stats.write_hits += 1,
                (false, true) => stats.read_retries += 1,
                (true, true) => stats.write_retries += 1,
            }
            self.retrying = false;
        }
        if activity.miss {
            stats.misses += 1;
            self.retrying = true;
        }
        if activity.reread {
            stats.rereads += 1;
        }
        if activity.evicted {
            stats.evictions += 1;
        }
        if activity.refilled {
            stats.refills += 1;
        }
        if let Some(w) = &transfers.w {
            stats.bytes_written += u64::from(w.byte_enable.count_ones());
        }
        if let Some(r) = &transfers.r {
            stats.bytes_read += r.data.len() as u64;
        }
    }

    /// Bus word `offset` of the data read port, little-endian.
    fn read_word(&self, offset: usize) -> u64 {
        let bytes = self.geometry.bus_bytes();
        let start = offset * bytes;
        self.data.read_data()[start..start + bytes]
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    }

    /// `dat_w` copied into every bus-word slot of a line.
    fn replicate(&self, dat_w: u64) -> Vec<u8> {
        let word = dat_w.to_le_bytes();
        let bytes = self.geometry.bus_bytes();
        word[..bytes]
            .iter()
            .copied()
            .cycle()
            .take(self.geometry.line_bytes())
            .collect()
    }

    /// Current protocol state.
    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Validated geometry.
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Contents of cache line `line`, or `None` past the last line.
    pub fn line(&self, line: usize) -> Option<CacheLine> {
        (line < self.geometry.lines()).then(|| {
            let entry = self.tags.peek(line);
            CacheLine {
                tag: entry.tag,
                dirty: entry.dirty,
                data: self.data.peek(line).to_vec(),
            }
        })
    }

    /// Activity counters since construction.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
