//! Shared test infrastructure.

/// Simulator wrapper and geometry presets.
pub mod harness;

/// Mock implementations of the backing store.
pub mod mocks;
