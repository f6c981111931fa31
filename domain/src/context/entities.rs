//! Entities for context aggregation
//!
//! [`ContextBundle`] is the snapshot handed to callers. It is assembled by
//! a [`ContextBundleBuilder`] and never mutated afterwards; every refresh
//! produces a new bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::value_objects::{ContextSlice, SliceKind};
use crate::tool::entities::ToolDescriptor;

/// A consistent, possibly partial snapshot of the agent's environment.
///
/// When `partial` is true one or more requested slices are missing; the ids
/// of the providers that failed are listed in `failed_providers`. Callers
/// must handle partial bundles and never assume completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    #[serde(default)]
    pub system: Value,
    #[serde(default)]
    pub workspace: Value,
    #[serde(default)]
    pub user: Value,
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    #[serde(default)]
    pub memory: BTreeMap<String, Value>,
    pub partial: bool,
    #[serde(default)]
    pub failed_providers: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ContextBundle {
    pub fn is_complete(&self) -> bool {
        !self.partial
    }

    pub fn has_slice(&self, kind: SliceKind) -> bool {
        match kind {
            SliceKind::System => !self.system.is_null(),
            SliceKind::Workspace => !self.workspace.is_null(),
            SliceKind::User => !self.user.is_null(),
            SliceKind::Tools => !self.tools.is_empty(),
            SliceKind::Memory => !self.memory.is_empty(),
        }
    }
}

/// Accumulates provider results for one aggregation call.
#[derive(Debug, Clone)]
pub struct ContextBundleBuilder {
    requested: BTreeSet<SliceKind>,
    system: Value,
    workspace: Value,
    user: Value,
    tools: Vec<ToolDescriptor>,
    memory: BTreeMap<String, Value>,
    delivered: BTreeSet<SliceKind>,
    failed_providers: Vec<String>,
}

impl ContextBundleBuilder {
    pub fn new(requested: impl IntoIterator<Item = SliceKind>) -> Self {
        Self {
            requested: requested.into_iter().collect(),
            system: Value::Null,
            workspace: Value::Null,
            user: Value::Null,
            tools: Vec::new(),
            memory: BTreeMap::new(),
            delivered: BTreeSet::new(),
            failed_providers: Vec::new(),
        }
    }

    /// Merge a slice. Slices that were not requested are ignored.
    ///
    /// Object-valued slices from several providers are merged key by key
    /// (later providers win on collisions); tools are deduplicated by name.
    pub fn merge(&mut self, slice: ContextSlice) {
        let kind = slice.kind();
        if !self.requested.contains(&kind) {
            return;
        }
        match slice {
            ContextSlice::System(value) => merge_value(&mut self.system, value),
            ContextSlice::Workspace(value) => merge_value(&mut self.workspace, value),
            ContextSlice::User(value) => merge_value(&mut self.user, value),
            ContextSlice::Tools(tools) => {
                for tool in tools {
                    if !self.tools.iter().any(|t| t.name == tool.name) {
                        self.tools.push(tool);
                    }
                }
            }
            ContextSlice::Memory(entries) => self.memory.extend(entries),
        }
        self.delivered.insert(kind);
    }

    pub fn record_failure(&mut self, provider_id: impl Into<String>) {
        let id = provider_id.into();
        if !self.failed_providers.contains(&id) {
            self.failed_providers.push(id);
        }
    }

    /// Requested slices nobody delivered.
    pub fn missing(&self) -> Vec<SliceKind> {
        self.requested.difference(&self.delivered).copied().collect()
    }

    pub fn build(self) -> ContextBundle {
        let partial = !self.failed_providers.is_empty() || !self.missing().is_empty();
        let mut failed_providers = self.failed_providers;
        failed_providers.sort();
        ContextBundle {
            system: self.system,
            workspace: self.workspace,
            user: self.user,
            tools: self.tools,
            memory: self.memory,
            partial,
            failed_providers,
            generated_at: Utc::now(),
        }
    }
}

fn merge_value(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(new)) => existing.extend(new),
        (target, incoming) => *target = incoming,
    }
}
