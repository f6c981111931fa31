//! Tool domain value objects - typed arguments, requests and results
//!
//! These types form the two ends of the invocation pipeline. Raw JSON
//! arguments arrive in an [`InvocationRequest`]; validation turns them into
//! [`ValidatedArgs`] whose values are closed [`ArgValue`] variants; the
//! engine finishes with an [`InvocationResult`] in a terminal state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::entities::ParamType;
use super::invocation::InvocationState;
use crate::access::Identity;
use crate::core::error::RuntimeError;

/// A validated argument value, one variant per declared [`ParamType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl ArgValue {
    /// Convert a raw value into the variant for `param_type`.
    ///
    /// Returns `None` when the value does not conform.
    pub fn coerce(param_type: ParamType, value: &Value) -> Option<Self> {
        match (param_type, value) {
            (ParamType::String, Value::String(s)) => Some(ArgValue::String(s.clone())),
            (ParamType::Integer, Value::Number(n)) => n.as_i64().map(ArgValue::Integer),
            (ParamType::Number, Value::Number(n)) => n.as_f64().map(ArgValue::Number),
            (ParamType::Boolean, Value::Bool(b)) => Some(ArgValue::Boolean(*b)),
            (ParamType::Array, Value::Array(items)) => Some(ArgValue::Array(items.clone())),
            (ParamType::Object, Value::Object(map)) => Some(ArgValue::Object(map.clone())),
            _ => None,
        }
    }

    /// Infer a variant for an undeclared (extra) argument. `null` has no variant.
    pub fn infer(value: &Value) -> Option<Self> {
        let param_type = match value {
            Value::Null => return None,
            Value::Bool(_) => ParamType::Boolean,
            Value::Number(n) if n.is_i64() => ParamType::Integer,
            Value::Number(_) => ParamType::Number,
            Value::String(_) => ParamType::String,
            Value::Array(_) => ParamType::Array,
            Value::Object(_) => ParamType::Object,
        };
        Self::coerce(param_type, value)
    }

    pub fn param_type(&self) -> ParamType {
        match self {
            ArgValue::String(_) => ParamType::String,
            ArgValue::Integer(_) => ParamType::Integer,
            ArgValue::Number(_) => ParamType::Number,
            ArgValue::Boolean(_) => ParamType::Boolean,
            ArgValue::Array(_) => ParamType::Array,
            ArgValue::Object(_) => ParamType::Object,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Integer(i) => Some(*i as f64),
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Size used by length constraints: chars, items or keys.
    pub fn length(&self) -> Option<usize> {
        match self {
            ArgValue::String(s) => Some(s.chars().count()),
            ArgValue::Array(items) => Some(items.len()),
            ArgValue::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ArgValue::String(s) => Value::String(s.clone()),
            ArgValue::Integer(i) => Value::from(*i),
            ArgValue::Number(n) => Value::from(*n),
            ArgValue::Boolean(b) => Value::Bool(*b),
            ArgValue::Array(items) => Value::Array(items.clone()),
            ArgValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

/// Arguments that passed validation, with defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidatedArgs(BTreeMap<String, ArgValue>);

impl ValidatedArgs {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(ArgValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(ArgValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(ArgValue::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(ArgValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

/// A request to invoke a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Name of the tool to call
    pub tool_name: String,
    /// Raw arguments, validated against the descriptor before execution
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
    /// Who is calling
    pub caller: Identity,
    /// Per-request timeout; the engine default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl InvocationRequest {
    pub fn new(tool_name: impl Into<String>, caller: Identity) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            caller,
            timeout_ms: None,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Result of an invocation, always in a terminal state.
///
/// Either `output` is set (state `Completed`) or `error` is set
/// (state `Failed` or `TimedOut`).
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub invocation_id: String,
    pub tool_name: String,
    pub state: InvocationState,
    pub output: Option<Value>,
    pub error: Option<RuntimeError>,
    pub duration_ms: u64,
}

impl InvocationResult {
    pub fn completed(
        invocation_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool_name: tool_name.into(),
            state: InvocationState::Completed,
            output: Some(output),
            error: None,
            duration_ms,
        }
    }

    pub fn failed(
        invocation_id: impl Into<String>,
        tool_name: impl Into<String>,
        state: InvocationState,
        error: RuntimeError,
        duration_ms: u64,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool_name: tool_name.into(),
            state,
            output: None,
            error: Some(error),
            duration_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == InvocationState::Completed
    }

    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&RuntimeError> {
        self.error.as_ref()
    }

    pub fn into_result(self) -> Result<Value, RuntimeError> {
        match (self.output, self.error) {
            (_, Some(error)) => Err(error),
            (Some(output), None) => Ok(output),
            (None, None) => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timeout_saturates_instead_of_wrapping() {
        let caller = Identity::new("agent-1");
        let request = InvocationRequest::new("t", caller.clone()).with_timeout(Duration::MAX);
        assert_eq!(request.timeout_ms, Some(u64::MAX));

        let request = InvocationRequest::new("t", caller).with_timeout(Duration::from_millis(1500));
        assert_eq!(request.timeout_ms, Some(1500));
    }

    #[test]
    fn test_coerce_closed_variants() {
        assert_eq!(
            ArgValue::coerce(ParamType::String, &json!("a")),
            Some(ArgValue::String("a".into()))
        );
        assert_eq!(
            ArgValue::coerce(ParamType::Integer, &json!(7)),
            Some(ArgValue::Integer(7))
        );
        assert_eq!(ArgValue::coerce(ParamType::Integer, &json!(7.5)), None);
        assert_eq!(
            ArgValue::coerce(ParamType::Number, &json!(7)),
            Some(ArgValue::Number(7.0))
        );
        assert_eq!(ArgValue::coerce(ParamType::Boolean, &json!("true")), None);
        assert_eq!(ArgValue::coerce(ParamType::Object, &json!(null)), None);
    }

    #[test]
    fn test_infer_rejects_null() {
        assert!(ArgValue::infer(&Value::Null).is_none());
        assert_eq!(ArgValue::infer(&json!(2)), Some(ArgValue::Integer(2)));
        assert_eq!(ArgValue::infer(&json!(2.5)), Some(ArgValue::Number(2.5)));
    }

    #[test]
    fn test_length() {
        assert_eq!(ArgValue::String("héllo".into()).length(), Some(5));
        assert_eq!(ArgValue::Array(vec![json!(1), json!(2)]).length(), Some(2));
        assert_eq!(ArgValue::Boolean(true).length(), None);
    }

    #[test]
    fn test_validated_args_accessors() {
        let mut args = ValidatedArgs::new();
        args.insert("path", ArgValue::String("/tmp/a".into()));
        args.insert("limit", ArgValue::Integer(10));
        args.insert("verbose", ArgValue::Boolean(false));

        assert_eq!(args.get_str("path"), Some("/tmp/a"));
        assert_eq!(args.get_i64("limit"), Some(10));
        assert_eq!(args.get_f64("limit"), Some(10.0));
        assert_eq!(args.get_bool("verbose"), Some(false));
        assert_eq!(args.get_str("limit"), None);
        assert_eq!(
            args.to_json(),
            json!({"path": "/tmp/a", "limit": 10, "verbose": false})
        );
    }

    #[test]
    fn test_request_timeout() {
        let req = InvocationRequest::new("t", Identity::new("agent"))
            .with_arg("x", 1)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(req.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(req.arguments["x"], json!(1));
    }

    #[test]
    fn test_result_into_result() {
        let ok = InvocationResult::completed("id", "t", json!("done"), 3);
        assert!(ok.is_success());
        assert_eq!(ok.into_result().unwrap(), json!("done"));

        let timed_out = InvocationResult::failed(
            "id",
            "t",
            InvocationState::TimedOut,
            RuntimeError::ToolTimeout {
                tool: "t".into(),
                timeout_ms: 5,
            },
            5,
        );
        assert!(!timed_out.is_success());
        assert!(matches!(
            timed_out.into_result(),
            Err(RuntimeError::ToolTimeout { .. })
        ));
    }
}
