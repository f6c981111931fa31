//! Port for the audit trail.
//!
//! Defines the [`AuditLogger`] trait for recording what the runtime did
//! (terminal invocation states, memory writes, denials, partial context
//! bundles) in a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port keeps a durable
//! record (JSONL in the default adapter).

use serde_json::Value;

/// A structured audit event.
pub struct AuditEvent {
    /// Event type identifier (e.g., "invocation", "memory_write", "access_denied").
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for writing audit events.
///
/// `log` is synchronous and infallible. Adapters report their own write
/// errors through `tracing` and never change the outcome of an operation.
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
