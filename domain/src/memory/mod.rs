//! Memory domain module
//!
//! Versioned key/value records that persist what an agent has learned.
//! The store (application layer) owns entry lifetime; this module only
//! defines the record shapes and the write limits.
//!
//! Versions start at 1 and increase by exactly one per update. A key that
//! is deleted and created again starts a fresh lifecycle at version 1.

pub mod entities;
pub mod validation;

pub use entities::{EntryRevision, MemoryEntry, MemoryMetadata};
pub use validation::MemoryLimits;
