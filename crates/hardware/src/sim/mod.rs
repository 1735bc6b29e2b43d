//! Cycle-level simulation harness.
//!
//! Composes a [`WritebackCache`](crate::cache::WritebackCache) with a backing store
//! and a bus initiator so the controller can be exercised without an HDL simulator:
//! 1. **Simulator:** Runs the three-phase cycle (store drives, cache steps, handshakes resolve).
//! 2. **Initiator:** A bus master that follows the request/acknowledge contract.
//! 3. **Workloads:** Seeded transaction generators and a shadow memory for checking reads.

/// Bus master that drives transactions into a simulator.
pub mod initiator;

/// Cache plus backing store, stepped one cycle at a time.
pub mod simulator;

/// Transaction generators and the reference memory.
pub mod workload;

pub use initiator::Initiator;
pub use simulator::Simulator;
pub use workload::{ShadowMemory, Transaction, Workload, XorShift};
