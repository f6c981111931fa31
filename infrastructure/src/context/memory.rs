//! Memory slice backed by the memory store.

use async_trait::async_trait;
use runtime_application::ports::context_provider::{ContextProvider, ProviderError};
use runtime_application::use_cases::memory_store::MemoryStore;
use runtime_domain::access::Identity;
use runtime_domain::context::{ContextSlice, SliceKind};
use runtime_domain::core::error::RuntimeError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Supplies the `memory` slice: selected keys, read as the caller.
///
/// Keys that don't exist or that the caller may not read are left out of
/// the slice. Any other store error fails the provider.
pub struct MemoryContextProvider {
    store: Arc<MemoryStore>,
    keys: Vec<String>,
}

impl MemoryContextProvider {
    pub fn new(store: Arc<MemoryStore>, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            store,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ContextProvider for MemoryContextProvider {
    fn id(&self) -> &str {
        "memory"
    }

    fn kind(&self) -> SliceKind {
        SliceKind::Memory
    }

    async fn fetch(&self, caller: &Identity) -> Result<ContextSlice, ProviderError> {
        let mut selected = BTreeMap::new();
        for key in &self.keys {
            match self.store.read(key, caller).await {
                Ok(entry) => {
                    selected.insert(key.clone(), entry.value);
                }
                Err(RuntimeError::MemoryNotFound(_)) | Err(RuntimeError::AccessDenied(_)) => {
                    debug!(key = %key, caller = %caller.id, "Memory key left out of context");
                }
                Err(e) => return Err(ProviderError::Unavailable(e.to_string())),
            }
        }
        Ok(ContextSlice::Memory(selected))
    }
}
