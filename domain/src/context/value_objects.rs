//! Value objects for context aggregation
//!
//! A [`ContextSlice`] is what a single provider returns: one typed piece of
//! the environment. [`SliceKind`] names the piece without its data and is
//! what callers use to request slices.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::tool::entities::ToolDescriptor;

/// The kinds of slice a bundle can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceKind {
    System,
    Workspace,
    User,
    Tools,
    Memory,
}

impl SliceKind {
    pub fn all() -> &'static [SliceKind] {
        &[
            SliceKind::System,
            SliceKind::Workspace,
            SliceKind::User,
            SliceKind::Tools,
            SliceKind::Memory,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            SliceKind::System => "system",
            SliceKind::Workspace => "workspace",
            SliceKind::User => "user",
            SliceKind::Tools => "tools",
            SliceKind::Memory => "memory",
        }
    }
}

impl std::fmt::Display for SliceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SliceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(SliceKind::System),
            "workspace" => Ok(SliceKind::Workspace),
            "user" => Ok(SliceKind::User),
            "tools" => Ok(SliceKind::Tools),
            "memory" => Ok(SliceKind::Memory),
            other => Err(format!("unknown context slice: {}", other)),
        }
    }
}

/// One typed slice of context returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ContextSlice {
    System(Value),
    Workspace(Value),
    User(Value),
    Tools(Vec<ToolDescriptor>),
    Memory(BTreeMap<String, Value>),
}

impl ContextSlice {
    pub fn kind(&self) -> SliceKind {
        match self {
            ContextSlice::System(_) => SliceKind::System,
            ContextSlice::Workspace(_) => SliceKind::Workspace,
            ContextSlice::User(_) => SliceKind::User,
            ContextSlice::Tools(_) => SliceKind::Tools,
            ContextSlice::Memory(_) => SliceKind::Memory,
        }
    }
}
