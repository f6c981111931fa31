//! Memory Store use case.
//!
//! [`MemoryStore`] is the only way entries are created, read, updated or
//! deleted. It validates keys and values, consults the access gate, seals
//! values on the way to the repository and unseals them on the way back.
//!
//! Concurrency control is entirely the repository's compare-and-increment.
//! The store never retries a conflicting write; the caller re-reads and
//! decides.

use crate::config::MemoryParams;
use crate::ports::access_control::AccessControlPort;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::memory_repository::MemoryRepository;
use crate::ports::value_sealer::{PlainSealer, ValueSealer};
use runtime_domain::access::{
    AccessDecision, AccessRequest, Action, Identity, ResourceKind, Sensitivity,
};
use runtime_domain::core::error::{RuntimeError, RuntimeResult};
use runtime_domain::memory::{MemoryEntry, MemoryMetadata};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

/// Versioned key/value store for agent memory.
pub struct MemoryStore {
    repository: Arc<dyn MemoryRepository>,
    access: Arc<dyn AccessControlPort>,
    sealer: Arc<dyn ValueSealer>,
    audit: Arc<dyn AuditLogger>,
    params: MemoryParams,
}

impl MemoryStore {
    pub fn new(
        repository: Arc<dyn MemoryRepository>,
        access: Arc<dyn AccessControlPort>,
        params: MemoryParams,
    ) -> Self {
        Self {
            repository,
            access,
            sealer: Arc::new(PlainSealer),
            audit: Arc::new(NoAuditLogger),
            params,
        }
    }

    pub fn with_sealer(mut self, sealer: Arc<dyn ValueSealer>) -> Self {
        self.sealer = sealer;
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Create `key` at version 1, owned by `caller`.
    ///
    /// Fails with `MemoryConflict` if the key already exists.
    pub async fn create(
        &self,
        key: &str,
        value: Value,
        caller: &Identity,
        sensitivity: Sensitivity,
    ) -> RuntimeResult<MemoryEntry> {
        self.params.limits.check_key(key)?;
        self.params.limits.check_value(&value)?;
        self.authorize(
            AccessRequest::new(caller, ResourceKind::Memory, key, Action::Create, sensitivity),
        )?;

        let sealed = self.seal(key, value.clone(), sensitivity)?;
        let entry = MemoryEntry::new(key, sealed, &caller.id, sensitivity);
        let stored = self
            .repository
            .insert_if_absent(entry)
            .await
            .map_err(|e| self.conflict_logged(e.into()))?;

        self.audit_write("create", &stored, caller);
        Ok(MemoryEntry { value, ..stored })
    }

    /// Read `key`. Sensitive entries go through the access gate.
    pub async fn read(&self, key: &str, caller: &Identity) -> RuntimeResult<MemoryEntry> {
        let entry = self.fetch(key).await?;
        if entry.sensitivity.requires_read_check() {
            self.authorize(
                AccessRequest::new(
                    caller,
                    ResourceKind::Memory,
                    key,
                    Action::Read,
                    entry.sensitivity,
                )
                .with_owner(&entry.owner),
            )?;
        }
        self.unseal(entry)
    }

    /// Replace the value of `key` if its version is still `expected_version`.
    ///
    /// On success the returned entry has version `expected_version + 1`. A
    /// stale version fails with `MemoryConflict` and leaves the entry
    /// untouched.
    pub async fn update(
        &self,
        key: &str,
        expected_version: u64,
        value: Value,
        caller: &Identity,
    ) -> RuntimeResult<MemoryEntry> {
        self.params.limits.check_value(&value)?;
        let current = self.fetch(key).await?;
        self.authorize(
            AccessRequest::new(
                caller,
                ResourceKind::Memory,
                key,
                Action::Update,
                current.sensitivity,
            )
            .with_owner(&current.owner),
        )?;

        // The write must land on the entry the gate saw, not on a newer
        // lifecycle of the same key.
        let sealed = self.seal(key, value.clone(), current.sensitivity)?;
        let stored = self
            .repository
            .compare_and_swap(key, current.at_version(expected_version), sealed)
            .await
            .map_err(|e| self.conflict_logged(e.into()))?;

        self.audit_write("update", &stored, caller);
        Ok(MemoryEntry { value, ..stored })
    }

    /// Delete `key`, optionally only if it is still at `expected_version`.
    ///
    /// Without an expected version the entry read for the access check must
    /// still be the one stored; anything else is a `MemoryConflict`.
    pub async fn delete(
        &self,
        key: &str,
        expected_version: Option<u64>,
        caller: &Identity,
    ) -> RuntimeResult<MemoryMetadata> {
        let current = self.fetch(key).await?;
        self.authorize(
            AccessRequest::new(
                caller,
                ResourceKind::Memory,
                key,
                Action::Delete,
                current.sensitivity,
            )
            .with_owner(&current.owner),
        )?;

        let removed = self
            .repository
            .delete_if_version(
                key,
                current.at_version(expected_version.unwrap_or(current.version)),
            )
            .await
            .map_err(|e| self.conflict_logged(e.into()))?;

        self.audit_write("delete", &removed, caller);
        Ok(removed.metadata())
    }

    /// Metadata of the entries under `prefix` that `caller` may list,
    /// sorted by key. Values are never included.
    pub async fn list(&self, prefix: Option<&str>, caller: &Identity) -> RuntimeResult<MemoryListing> {
        let entries = self.repository.list(prefix).await?;
        Ok(MemoryListing {
            entries: entries.into_iter(),
            access: Arc::clone(&self.access),
            caller: caller.clone(),
        })
    }

    async fn fetch(&self, key: &str) -> RuntimeResult<MemoryEntry> {
        self.repository
            .get(key)
            .await?
            .ok_or_else(|| RuntimeError::MemoryNotFound(key.to_string()))
    }

    fn authorize(&self, request: AccessRequest<'_>) -> RuntimeResult<()> {
        match self.access.authorize(&request) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny { reason } => {
                info!(
                    key = request.resource_id,
                    caller = %request.identity.id,
                    action = request.action.as_str(),
                    "Memory access denied"
                );
                self.audit.log(AuditEvent::new(
                    "access_denied",
                    json!({
                        "resource": "memory",
                        "key": request.resource_id,
                        "caller": request.identity.id,
                        "action": request.action.as_str(),
                        "reason": reason,
                    }),
                ));
                Err(RuntimeError::AccessDenied(reason))
            }
        }
    }

    fn seal(&self, key: &str, value: Value, sensitivity: Sensitivity) -> RuntimeResult<Value> {
        self.sealer
            .seal(key, value, sensitivity)
            .map_err(|e| RuntimeError::Storage(e.to_string()))
    }

    fn unseal(&self, entry: MemoryEntry) -> RuntimeResult<MemoryEntry> {
        let value = self
            .sealer
            .unseal(&entry.key, entry.value.clone(), entry.sensitivity)
            .map_err(|e| RuntimeError::Storage(e.to_string()))?;
        Ok(MemoryEntry { value, ..entry })
    }

    fn conflict_logged(&self, err: RuntimeError) -> RuntimeError {
        if let RuntimeError::MemoryConflict {
            key,
            expected,
            actual,
        } = &err
        {
            debug!(key = %key, expected, actual, "Memory write lost version race");
        }
        err
    }

    fn audit_write(&self, op: &str, entry: &MemoryEntry, caller: &Identity) {
        debug!(key = %entry.key, version = entry.version, op, "Memory write");
        self.audit.log(AuditEvent::new(
            "memory_write",
            json!({
                "op": op,
                "key": entry.key,
                "version": entry.version,
                "caller": caller.id,
                "sensitivity": entry.sensitivity,
            }),
        ));
    }
}

/// Lazy listing returned by [`MemoryStore::list`].
///
/// The access check for each entry runs as the sequence advances; entries
/// the caller may not list are skipped.
pub struct MemoryListing {
    entries: std::vec::IntoIter<MemoryMetadata>,
    access: Arc<dyn AccessControlPort>,
    caller: Identity,
}

impl Iterator for MemoryListing {
    type Item = MemoryMetadata;

    fn next(&mut self) -> Option<Self::Item> {
        for meta in self.entries.by_ref() {
            let request = AccessRequest::new(
                &self.caller,
                ResourceKind::Memory,
                &meta.key,
                Action::List,
                meta.sensitivity,
            )
            .with_owner(&meta.owner);
            if self.access.authorize(&request).is_allowed() {
                return Some(meta);
            }
        }
        None
    }
}
