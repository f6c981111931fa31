//! Aggregate Context use case.
//!
//! [`ContextAggregator`] asks every provider serving a requested slice for
//! its data, all at once, each under its own timeout. Whatever comes back in
//! time is merged into a fresh [`ContextBundle`]; everything else is
//! recorded in `failed_providers` and the bundle is marked partial.
//!
//! Aggregation itself never fails. A caller that gets a bundle with every
//! provider failed still gets a bundle.

use crate::config::AggregationParams;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::context_provider::{ContextProvider, ProviderError};
use futures::future::join_all;
use runtime_domain::access::Identity;
use runtime_domain::context::{ContextBundle, ContextBundleBuilder, ContextSlice, SliceKind};
use runtime_domain::core::error::RuntimeError;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Builds context bundles from a set of providers.
pub struct ContextAggregator {
    providers: Vec<Arc<dyn ContextProvider>>,
    params: AggregationParams,
    audit: Arc<dyn AuditLogger>,
}

impl ContextAggregator {
    pub fn new(params: AggregationParams) -> Self {
        Self {
            providers: Vec::new(),
            params,
            audit: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Aggregate the requested slices for `caller`.
    ///
    /// An empty `requested` list means every slice.
    pub async fn aggregate(&self, requested: &[SliceKind], caller: &Identity) -> ContextBundle {
        let requested: Vec<SliceKind> = if requested.is_empty() {
            SliceKind::all().to_vec()
        } else {
            requested.to_vec()
        };
        let started = Instant::now();

        let selected: Vec<&Arc<dyn ContextProvider>> = self
            .providers
            .iter()
            .filter(|p| requested.contains(&p.kind()))
            .collect();

        for kind in &requested {
            if !selected.iter().any(|p| p.kind() == *kind) {
                warn!(slice = %kind, "No provider serves requested context slice");
            }
        }

        let futures = selected.iter().map(|provider| self.fetch_one(provider, caller));
        let results = join_all(futures).await;

        let mut builder = ContextBundleBuilder::new(requested.iter().copied());
        let mut errors: Vec<Value> = Vec::new();
        for (provider_id, result) in results {
            match result {
                Ok(slice) => builder.merge(slice),
                Err(error) => {
                    warn!(
                        provider = %provider_id,
                        code = %error.code(),
                        %error,
                        "Context provider failed"
                    );
                    errors.push(json!({
                        "provider": provider_id,
                        "code": error.code().as_str(),
                        "message": error.to_string(),
                    }));
                    builder.record_failure(provider_id);
                }
            }
        }

        let bundle = builder.build();
        debug!(
            providers = selected.len(),
            failed = bundle.failed_providers.len(),
            partial = bundle.partial,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Context aggregated"
        );
        if bundle.partial {
            self.audit.log(AuditEvent::new(
                "context_partial",
                json!({
                    "caller": caller.id,
                    "requested": requested,
                    "failed_providers": bundle.failed_providers,
                    "errors": errors,
                }),
            ));
        }
        bundle
    }

    async fn fetch_one(
        &self,
        provider: &Arc<dyn ContextProvider>,
        caller: &Identity,
    ) -> (String, Result<ContextSlice, RuntimeError>) {
        let timeout = provider.timeout().unwrap_or(self.params.provider_timeout);
        let expected = provider.kind();

        let result = match tokio::time::timeout(timeout, provider.fetch(caller)).await {
            Ok(Ok(slice)) if slice.kind() == expected => Ok(slice),
            Ok(Ok(slice)) => Err(ProviderError::WrongSlice {
                expected,
                actual: slice.kind(),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        };
        let id = provider.id().to_string();
        let result = result.map_err(|e| e.into_runtime_error(id.clone()));
        (id, result)
    }
}
