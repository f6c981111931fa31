//! Fixed slices supplied by the host.

use async_trait::async_trait;
use runtime_application::ports::context_provider::{ContextProvider, ProviderError};
use runtime_domain::access::Identity;
use runtime_domain::context::{ContextSlice, SliceKind};

/// Returns the same slice on every fetch.
///
/// Used for facts the host knows up front, such as values from the
/// `[context]` section of the config file.
pub struct StaticContextProvider {
    id: String,
    slice: ContextSlice,
}

impl StaticContextProvider {
    pub fn new(id: impl Into<String>, slice: ContextSlice) -> Self {
        Self {
            id: id.into(),
            slice,
        }
    }
}

#[async_trait]
impl ContextProvider for StaticContextProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> SliceKind {
        self.slice.kind()
    }

    async fn fetch(&self, _caller: &Identity) -> Result<ContextSlice, ProviderError> {
        Ok(self.slice.clone())
    }
}
