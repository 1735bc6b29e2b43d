//! Backing-Store Protocol Monitor.
//!
//! Watches both halves of the port every cycle and checks the rules the cache
//! must follow towards the store:
//! 1. **Single in-flight operation:** no channel is offered again once its transfer
//!    for the current operation has completed, and no new command is offered
//!    before the previous operation finished.
//! 2. **No partial command:** a read beat only completes under `we = false`, a
//!    write beat only under `we = true`, and never both in one operation.
//!
//! Every completed operation is appended to a log, which is how tests observe
//! evictions and refills from the store's point of view.

use tracing::debug;

use super::{Command, PortRequest, ReadBeat, Transfers, WriteBeat};
use crate::common::ProtocolViolation;

/// One finished backing-store operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedOp {
    /// Cycle of the edge on which the operation completed.
    pub cycle: u64,
    /// Block address of the command.
    pub addr: u64,
    /// Write (`true`) or read (`false`).
    pub we: bool,
    /// `last` flag of the command.
    pub last: bool,
    /// Data written or read.
    pub data: Vec<u8>,
    /// Byte enable of a write; zero for reads.
    pub byte_enable: u64,
}

/// Per-operation protocol checker with a log of completed operations.
#[derive(Clone, Debug, Default)]
pub struct ProtocolMonitor {
    cycle: u64,
    cmd: Option<Command>,
    w: Option<WriteBeat>,
    r: Option<ReadBeat>,
    log: Vec<CompletedOp>,
}

impl ProtocolMonitor {
    /// Creates an idle monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks one cycle and records the transfers of its clock edge.
    ///
    /// # Arguments
    ///
    /// * `request` - The cache's half of the port this cycle.
    /// * `transfers` - The handshakes that fired on the closing edge.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProtocolViolation`] found this cycle.
    pub fn observe(
        &mut self,
        request: &PortRequest,
        transfers: &Transfers,
    ) -> Result<(), ProtocolViolation> {
        let cycle = self.cycle;
        self.cycle += 1;

        if request.cmd.is_some() && self.cmd.is_some() {
            return Err(ProtocolViolation::OverlappingCommand { cycle });
        }
        if request.w.is_some() && self.w.is_some() {
            return Err(ProtocolViolation::DuplicateWrite { cycle });
        }
        if request.r_ready && self.r.is_some() {
            return Err(ProtocolViolation::DuplicateRead { cycle });
        }

        if let Some(cmd) = transfers.cmd {
            self.cmd = Some(cmd);
        }
        if let Some(w) = &transfers.w {
            self.w = Some(w.clone());
        }
        if let Some(r) = &transfers.r {
            self.r = Some(r.clone());
        }

        if self.r.is_some() && self.w.is_some() {
            return Err(ProtocolViolation::MixedOperation { cycle });
        }

        let Some(cmd) = self.cmd else {
            return Ok(());
        };
        if cmd.we && self.r.is_some() {
            return Err(ProtocolViolation::MismatchedBeat {
                cycle,
                beat: "read",
                we: true,
            });
        }
        if !cmd.we && self.w.is_some() {
            return Err(ProtocolViolation::MismatchedBeat {
                cycle,
                beat: "write",
                we: false,
            });
        }

        let finished = if cmd.we {
            self.w.take().map(|w| (w.data, w.byte_enable))
        } else {
            self.r.take().map(|r| (r.data, 0))
        };
        if let Some((data, byte_enable)) = finished {
            debug!(
                cycle,
                addr = cmd.addr,
                we = cmd.we,
                "backing-store operation complete"
            );
            self.cmd = None;
            self.log.push(CompletedOp {
                cycle,
                addr: cmd.addr,
                we: cmd.we,
                last: cmd.last,
                data,
                byte_enable,
            });
        }
        Ok(())
    }

    /// True while a command has been accepted but its data beat has not.
    pub fn is_busy(&self) -> bool {
        self.cmd.is_some() || self.w.is_some() || self.r.is_some()
    }

    /// Completed operations, oldest first.
    pub fn log(&self) -> &[CompletedOp] {
        &self.log
    }

    /// Completed write operations, oldest first.
    pub fn writes(&self) -> impl Iterator<Item = &CompletedOp> {
        self.log.iter().filter(|op| op.we)
    }

    /// Completed read operations, oldest first.
    pub fn reads(&self) -> impl Iterator<Item = &CompletedOp> {
        self.log.iter().filter(|op| !op.we)
    }
}
