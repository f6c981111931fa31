//! Memory repository port
//!
//! Storage for memory entries. Every write is a single atomic step on one
//! key: insert-if-absent, compare-and-swap, or delete-if-version.
//! Operations on different keys never block each other.
//!
//! Conditional writes name an [`EntryRevision`]: the lifecycle and version
//! the caller last saw. An entry that was deleted and created again under
//! the same key never matches a revision taken before the delete.

use async_trait::async_trait;
use runtime_domain::core::error::RuntimeError;
use runtime_domain::memory::{EntryRevision, MemoryEntry, MemoryMetadata};
use serde_json::Value;
use thiserror::Error;

/// Errors reported by a memory repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Key already exists: {key} (version {version})")]
    AlreadyExists { key: String, version: u64 },

    #[error("Version mismatch on {key}: expected {expected}, found {actual}")]
    VersionMismatch {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Entry {key} was replaced since version {expected} was read (now at {actual})")]
    Replaced {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

impl From<RepositoryError> for RuntimeError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(key) => RuntimeError::MemoryNotFound(key),
            // Creating over an existing entry is a conflict against "no version".
            RepositoryError::AlreadyExists { key, version } => RuntimeError::MemoryConflict {
                key,
                expected: 0,
                actual: version,
            },
            RepositoryError::VersionMismatch {
                key,
                expected,
                actual,
            }
            | RepositoryError::Replaced {
                key,
                expected,
                actual,
            } => RuntimeError::MemoryConflict {
                key,
                expected,
                actual,
            },
            RepositoryError::Backend(message) => RuntimeError::Storage(message),
        }
    }
}

/// Check that `current` is the entry `expected` was taken from.
///
/// Adapters call this under the same lock as the write it guards.
pub fn ensure_revision(
    current: &MemoryEntry,
    expected: EntryRevision,
) -> Result<(), RepositoryError> {
    if current.lifecycle != expected.lifecycle {
        return Err(RepositoryError::Replaced {
            key: current.key.clone(),
            expected: expected.version,
            actual: current.version,
        });
    }
    if current.version != expected.version {
        return Err(RepositoryError::VersionMismatch {
            key: current.key.clone(),
            expected: expected.version,
            actual: current.version,
        });
    }
    Ok(())
}

/// Port for memory entry storage.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<MemoryEntry>, RepositoryError>;

    /// Store `entry` only if its key is absent.
    async fn insert_if_absent(&self, entry: MemoryEntry) -> Result<MemoryEntry, RepositoryError>;

    /// Replace the value of `key` if it is still at `expected`, producing
    /// version `expected.version + 1` in the same lifecycle.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: EntryRevision,
        value: Value,
    ) -> Result<MemoryEntry, RepositoryError>;

    /// Remove `key` if it is still at `expected`.
    async fn delete_if_version(
        &self,
        key: &str,
        expected: EntryRevision,
    ) -> Result<MemoryEntry, RepositoryError>;

    /// Metadata of entries whose key starts with `prefix`, sorted by key.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<MemoryMetadata>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_domain::access::Sensitivity;
    use serde_json::json;

    #[test]
    fn test_ensure_revision() {
        let entry = MemoryEntry::new("k", json!(1), "alice", Sensitivity::Public);
        assert!(ensure_revision(&entry, entry.revision()).is_ok());
        assert!(matches!(
            ensure_revision(&entry, entry.at_version(2)),
            Err(RepositoryError::VersionMismatch { expected: 2, actual: 1, .. })
        ));

        let recreated = MemoryEntry::new("k", json!(1), "bob", Sensitivity::Secret);
        assert!(matches!(
            ensure_revision(&recreated, entry.revision()),
            Err(RepositoryError::Replaced { .. })
        ));
    }

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        let err: RuntimeError = RepositoryError::NotFound("k".into()).into();
        assert_eq!(err, RuntimeError::MemoryNotFound("k".into()));

        let err: RuntimeError = RepositoryError::VersionMismatch {
            key: "k".into(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(err.is_conflict());

        let err: RuntimeError = RepositoryError::AlreadyExists {
            key: "k".into(),
            version: 4,
        }
        .into();
        assert!(err.is_conflict());

        let err: RuntimeError = RepositoryError::Replaced {
            key: "k".into(),
            expected: 1,
            actual: 1,
        }
        .into();
        assert!(err.is_conflict());

        let err: RuntimeError = RepositoryError::Backend("disk full".into()).into();
        assert_eq!(err.code().as_str(), "STORAGE_ERROR");
    }
}
