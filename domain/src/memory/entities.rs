//! Memory domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::access::Sensitivity;

/// A versioned memory record.
///
/// Created at version 1; every successful update produces a copy with
/// `version + 1`. Entries are only ever replaced wholesale through the
/// store's compare-and-increment step, never edited in place.
///
/// `lifecycle` is fresh for every create. A key that is deleted and
/// created again restarts at version 1 under a new lifecycle, so a
/// version number alone never identifies an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: String,
    pub value: Value,
    pub version: u64,
    pub lifecycle: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sensitivity: Sensitivity,
    pub owner: String,
}

impl MemoryEntry {
    pub fn new(
        key: impl Into<String>,
        value: Value,
        owner: impl Into<String>,
        sensitivity: Sensitivity,
    ) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value,
            version: 1,
            lifecycle: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            sensitivity,
            owner: owner.into(),
        }
    }

    /// The successor of this entry carrying `value`.
    pub fn next(&self, value: Value) -> Self {
        Self {
            key: self.key.clone(),
            value,
            version: self.version + 1,
            lifecycle: self.lifecycle,
            created_at: self.created_at,
            updated_at: Utc::now(),
            sensitivity: self.sensitivity,
            owner: self.owner.clone(),
        }
    }

    /// The revision this entry is at.
    pub fn revision(&self) -> EntryRevision {
        self.at_version(self.version)
    }

    /// A revision in this entry's lifecycle at `version`.
    pub fn at_version(&self, version: u64) -> EntryRevision {
        EntryRevision {
            lifecycle: self.lifecycle,
            version,
        }
    }

    pub fn metadata(&self) -> MemoryMetadata {
        MemoryMetadata {
            key: self.key.clone(),
            version: self.version,
            updated_at: self.updated_at,
            sensitivity: self.sensitivity,
            owner: self.owner.clone(),
        }
    }
}

/// What a conditional write expects to find under a key: one lifecycle of
/// the entry at one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryRevision {
    pub lifecycle: Uuid,
    pub version: u64,
}

/// Entry metadata returned by `list`; never carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub key: String,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
    pub sensitivity: Sensitivity,
    pub owner: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_starts_at_version_one() {
        let entry = MemoryEntry::new("prefs/theme", json!("dark"), "alice", Sensitivity::Public);
        assert_eq!(entry.version, 1);
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn test_next_increments_version_and_keeps_identity() {
        let entry = MemoryEntry::new("k", json!(1), "alice", Sensitivity::Internal);
        let next = entry.next(json!(2));
        assert_eq!(next.version, 2);
        assert_eq!(next.value, json!(2));
        assert_eq!(next.owner, "alice");
        assert_eq!(next.created_at, entry.created_at);
        assert!(next.updated_at >= entry.updated_at);
    }

    #[test]
    fn test_recreated_entry_has_new_lifecycle() {
        let first = MemoryEntry::new("k", json!(1), "mallory", Sensitivity::Public);
        let second = MemoryEntry::new("k", json!(1), "alice", Sensitivity::Secret);
        assert_eq!(first.version, second.version);
        assert_ne!(first.revision(), second.revision());
        assert_eq!(first.next(json!(2)).lifecycle, first.lifecycle);
        assert_eq!(first.at_version(3).version, 3);
    }

    #[test]
    fn test_metadata_omits_value() {
        let entry = MemoryEntry::new("k", json!({"secret": true}), "bob", Sensitivity::Secret);
        let meta = serde_json::to_value(entry.metadata()).unwrap();
        assert!(meta.get("value").is_none());
        assert_eq!(meta["sensitivity"], "secret");
    }
}
