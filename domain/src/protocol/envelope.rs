//! The message envelope every request and reply travels in

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{ErrorCode, RuntimeError};

/// Envelope type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Request,
    Response,
    Error,
}

impl EnvelopeKind {
    pub fn as_str(&self) -> &str {
        match self {
            EnvelopeKind::Request => "request",
            EnvelopeKind::Response => "response",
            EnvelopeKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `error` member of an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&RuntimeError> for ErrorPayload {
    fn from(err: &RuntimeError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggestion: err.suggestion(),
        }
    }
}

impl From<RuntimeError> for ErrorPayload {
    fn from(err: RuntimeError) -> Self {
        Self::from(&err)
    }
}

/// Transport-neutral wrapper correlating a request with its single reply.
///
/// A reply always carries the `id` of the request it answers, whether it is
/// a `response` or an `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    #[serde(default = "empty_object")]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl MessageEnvelope {
    pub fn request(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            kind: EnvelopeKind::Request,
            payload,
            error: None,
        }
    }

    pub fn response(id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            kind: EnvelopeKind::Response,
            payload,
            error: None,
        }
    }

    pub fn error(id: impl Into<String>, err: &RuntimeError) -> Self {
        Self {
            id: id.into(),
            kind: EnvelopeKind::Error,
            payload: empty_object(),
            error: Some(ErrorPayload::from(err)),
        }
    }

    /// Replace the payload. Error envelopes use it for what the failed
    /// operation had already established.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// The reply to this envelope: a response on success, an error otherwise.
    pub fn reply(&self, result: Result<Value, RuntimeError>) -> Self {
        match result {
            Ok(payload) => Self::response(self.id.clone(), payload),
            Err(err) => Self::error(self.id.clone(), &err),
        }
    }

    pub fn is_request(&self) -> bool {
        self.kind == EnvelopeKind::Request
    }

    pub fn is_error(&self) -> bool {
        self.kind == EnvelopeKind::Error
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}
