//! In-memory memory repository.
//!
//! Backed by a `DashMap`, so each key lives in one shard and every write
//! runs under that shard's lock. Writes to different keys proceed in
//! parallel; the revision check and the write for one key are a single
//! atomic step. Contents are lost when the process exits.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use runtime_application::ports::memory_repository::{
    MemoryRepository, RepositoryError, ensure_revision,
};
use runtime_domain::memory::{EntryRevision, MemoryEntry, MemoryMetadata};
use serde_json::Value;

/// In-memory [`MemoryRepository`] for development, tests and single-process hosts.
#[derive(Debug, Default)]
pub struct InMemoryMemoryRepository {
    entries: DashMap<String, MemoryEntry>,
}

impl InMemoryMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl MemoryRepository for InMemoryMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<MemoryEntry>, RepositoryError> {
        Ok(self.entries.get(key).map(|e| e.clone()))
    }

    async fn insert_if_absent(&self, entry: MemoryEntry) -> Result<MemoryEntry, RepositoryError> {
        match self.entries.entry(entry.key.clone()) {
            Entry::Occupied(existing) => Err(RepositoryError::AlreadyExists {
                key: entry.key,
                version: existing.get().version,
            }),
            Entry::Vacant(slot) => {
                slot.insert(entry.clone());
                Ok(entry)
            }
        }
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: EntryRevision,
        value: Value,
    ) -> Result<MemoryEntry, RepositoryError> {
        let mut slot = self
            .entries
            .get_mut(key)
            .ok_or_else(|| RepositoryError::NotFound(key.to_string()))?;
        ensure_revision(&slot, expected)?;

        let next = slot.next(value);
        *slot = next.clone();
        Ok(next)
    }

    async fn delete_if_version(
        &self,
        key: &str,
        expected: EntryRevision,
    ) -> Result<MemoryEntry, RepositoryError> {
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(_) => Err(RepositoryError::NotFound(key.to_string())),
            Entry::Occupied(existing) => {
                ensure_revision(existing.get(), expected)?;
                Ok(existing.remove())
            }
        }
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<MemoryMetadata>, RepositoryError> {
        let mut metadata: Vec<MemoryMetadata> = self
            .entries
            .iter()
            .filter(|e| prefix.is_none_or(|p| e.key().starts_with(p)))
            .map(|e| e.value().metadata())
            .collect();
        metadata.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(metadata)
    }
}
