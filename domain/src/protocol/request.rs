//! Request payloads carried inside request envelopes
//!
//! The payload of a `request` envelope names the caller and one operation,
//! selected by the `op` tag:
//!
//! ```json
//! {
//!   "caller": { "id": "agent-7", "roles": ["reader"] },
//!   "op": "memory.update",
//!   "key": "prefs/theme",
//!   "expected_version": 3,
//!   "value": "dark"
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::access::{Identity, Sensitivity};
use crate::context::SliceKind;
use crate::core::error::RuntimeError;
use crate::tool::entities::ToolFilter;

/// One runtime operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum RuntimeOperation {
    #[serde(rename = "invoke")]
    Invoke {
        tool: String,
        #[serde(default)]
        arguments: HashMap<String, Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    #[serde(rename = "discover")]
    Discover {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<ToolFilter>,
    },
    #[serde(rename = "get_tool")]
    GetTool { name: String },
    /// An empty slice list asks for every slice.
    #[serde(rename = "aggregate")]
    Aggregate {
        #[serde(default)]
        slices: Vec<SliceKind>,
    },
    #[serde(rename = "memory.create")]
    MemoryCreate {
        key: String,
        value: Value,
        #[serde(default)]
        sensitivity: Sensitivity,
    },
    #[serde(rename = "memory.read")]
    MemoryRead { key: String },
    #[serde(rename = "memory.update")]
    MemoryUpdate {
        key: String,
        expected_version: u64,
        value: Value,
    },
    #[serde(rename = "memory.delete")]
    MemoryDelete {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_version: Option<u64>,
    },
    #[serde(rename = "memory.list")]
    MemoryList {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
    },
}

impl RuntimeOperation {
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeOperation::Invoke { .. } => "invoke",
            RuntimeOperation::Discover { .. } => "discover",
            RuntimeOperation::GetTool { .. } => "get_tool",
            RuntimeOperation::Aggregate { .. } => "aggregate",
            RuntimeOperation::MemoryCreate { .. } => "memory.create",
            RuntimeOperation::MemoryRead { .. } => "memory.read",
            RuntimeOperation::MemoryUpdate { .. } => "memory.update",
            RuntimeOperation::MemoryDelete { .. } => "memory.delete",
            RuntimeOperation::MemoryList { .. } => "memory.list",
        }
    }
}

/// Decoded payload of a request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeRequest {
    pub caller: Identity,
    #[serde(flatten)]
    pub operation: RuntimeOperation,
}

impl RuntimeRequest {
    pub fn new(caller: Identity, operation: RuntimeOperation) -> Self {
        Self { caller, operation }
    }

    /// Decode a request payload, mapping any shape error to `INVALID_REQUEST`.
    pub fn from_payload(payload: &Value) -> Result<Self, RuntimeError> {
        serde_json::from_value(payload.clone())
            .map_err(|e| RuntimeError::InvalidRequest(format!("undecodable payload: {}", e)))
    }

    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
