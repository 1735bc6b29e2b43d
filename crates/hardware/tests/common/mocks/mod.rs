//! Mock collaborators.

/// Mock and scripted backing stores.
pub mod store;
