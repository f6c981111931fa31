//! Access control port
//!
//! The shared authorization gate consulted by the invocation engine and the
//! memory store before any mutation or sensitive read. The call is
//! synchronous; policies that need I/O should cache ahead of time.

use runtime_domain::access::{AccessDecision, AccessRequest};

/// Port for authorization decisions.
pub trait AccessControlPort: Send + Sync {
    /// Decide whether `request` may proceed.
    fn authorize(&self, request: &AccessRequest<'_>) -> AccessDecision;
}

/// Allows everything. For tests and single-tenant hosts.
pub struct AllowAll;

impl AccessControlPort for AllowAll {
    fn authorize(&self, _request: &AccessRequest<'_>) -> AccessDecision {
        AccessDecision::Allow
    }
}

/// Denies everything.
pub struct DenyAll;

impl AccessControlPort for DenyAll {
    fn authorize(&self, request: &AccessRequest<'_>) -> AccessDecision {
        AccessDecision::deny(format!(
            "{} on {} '{}' is not permitted",
            request.action.as_str(),
            request.resource_kind.as_str(),
            request.resource_id
        ))
    }
}
