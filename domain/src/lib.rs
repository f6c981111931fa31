//! Domain layer for agent-runtime
//!
//! This crate contains the core entities, value objects, validation rules
//! and the error taxonomy. It has no dependencies on infrastructure or on
//! any async runtime.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A tool is an external capability described by a [`ToolDescriptor`].
//! Calls are checked against the descriptor before anything runs, and each
//! invocation walks the [`InvocationState`] machine:
//!
//! ```text
//! Received → Validated → Authorized → Executing → Completed | Failed | TimedOut
//! ```
//!
//! ## Context
//!
//! A [`ContextBundle`] is an immutable snapshot assembled from independent
//! slices. Missing slices make the bundle partial rather than failing it.
//!
//! ## Memory
//!
//! [`MemoryEntry`] records are versioned. Writes name the version they
//! expect, and a mismatch is a conflict the caller resolves.
//!
//! ## Protocol
//!
//! Everything travels in a [`MessageEnvelope`]; errors carry a stable
//! [`ErrorCode`], a recoverable flag and an optional suggestion.

pub mod access;
pub mod context;
pub mod core;
pub mod memory;
pub mod protocol;
pub mod tool;

// Re-export commonly used types
pub use access::{AccessDecision, AccessRequest, Action, Identity, ResourceKind, Sensitivity};
pub use context::{ContextBundle, ContextBundleBuilder, ContextSlice, SliceKind};
pub use core::error::{ErrorCode, RuntimeError, RuntimeResult};
pub use memory::{EntryRevision, MemoryEntry, MemoryLimits, MemoryMetadata};
pub use protocol::{
    EnvelopeKind, ErrorPayload, MessageEnvelope, RuntimeOperation, RuntimeRequest,
};
pub use tool::{
    ArgValue, Constraint, DefaultToolValidator, IllegalTransition, InvocationRequest,
    InvocationResult, InvocationState, InvocationTracker, ParamType, ReturnSpec, ToolDescriptor,
    ToolFilter, ToolParameter, ToolValidator, ValidatedArgs, ValidationError,
};
