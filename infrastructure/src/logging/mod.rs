//! Logging infrastructure
//!
//! - [`init_tracing`] installs the `tracing` subscriber for diagnostic logs
//! - [`JsonlAuditLogger`] writes the audit trail, implementing the
//!   [`AuditLogger`](runtime_application::AuditLogger) port

mod jsonl_audit_logger;
mod tracing_setup;

pub use jsonl_audit_logger::JsonlAuditLogger;
pub use tracing_setup::{init_tracing, verbosity_filter};
