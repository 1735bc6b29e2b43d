//! Common utilities and types used throughout the cache model.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the model. It includes:
//! 1. **Address Types:** Named `{offset, line, tag}` fields and their validated layout.
//! 2. **Constants:** Width limits and bus defaults.
//! 3. **Error Handling:** Configuration, protocol, and simulation error types.

/// Address decomposition (offset, line, tag).
pub mod addr;

/// Common constants used throughout the model.
pub mod constants;

/// Error types for configuration, port protocol, and simulation.
pub mod error;

pub use addr::{AddressLayout, DecodedAddr};
pub use error::{ConfigError, ProtocolViolation, SimError};
