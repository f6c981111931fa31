//! Access control domain module
//!
//! Pure value types for the shared authorization gate. The gate itself is a
//! port (`AccessControlPort`) in the application layer; adapters decide
//! policy. Both the invocation engine and the memory store build an
//! [`AccessRequest`] and consult the gate synchronously before any mutation
//! or sensitive read.
//!
//! Denials are always reported to the caller as `ACCESS_DENIED`; they are
//! never downgraded to a silent no-op.

pub mod entities;

pub use entities::{AccessDecision, AccessRequest, Action, Identity, ResourceKind, Sensitivity};
