//! Cache protocol states.
//!
//! The controller is in exactly one of three states. Eviction and refill each
//! carry their own completion flags, so leaving the state clears them.

/// Handshakes completed so far during an eviction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvictProgress {
    /// Write command accepted.
    pub cmd: bool,
    /// Line data accepted.
    pub w: bool,
}

impl EvictProgress {
    /// Both the command and the write beat have completed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.cmd && self.w
    }
}

/// Handshakes completed so far during a refill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefillProgress {
    /// Read command accepted.
    pub cmd: bool,
    /// Line data received.
    pub r: bool,
}

impl RefillProgress {
    /// Both the command and the read beat have completed.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.cmd && self.r
    }
}

/// State of the cache protocol machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheState {
    /// Serving hits; compares last cycle's read against the current request.
    #[default]
    Check,
    /// Writing a dirty victim line back.
    Evict(EvictProgress),
    /// Fetching the requested line.
    Refill(RefillProgress),
}

impl CacheState {
    /// Short upper-case name, as used in trace output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Check => "CHECK",
            Self::Evict(_) => "EVICT",
            Self::Refill(_) => "REFILL",
        }
    }

    /// The machine is waiting on the backing store.
    pub fn is_stalled(&self) -> bool {
        !matches!(self, Self::Check)
    }
}
