/// JSON-RPC 2.0 envelopes as spoken over the tool-server endpoint.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision advertised in `initialize` unless the caller overrides it.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-03-26";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Correlation identifier pairing a request with its response.
///
/// Every outbound request draws a fresh random token, so two requests never
/// share an id regardless of which task issued them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `value` is exactly this id as it would appear on the wire.
    pub fn matches(&self, value: &Value) -> bool {
        value.as_str() == Some(self.0.as_str())
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl JsonRpcRequest {
    /// Builds a request with a freshly generated id.
    pub fn new(method: impl Into<String>, params: Option<Map<String, Value>>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::generate(),
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: None,
        }
    }
}

/// Outbound message: requests expect a correlated response, notifications don't.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

impl OutgoingMessage {
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            OutgoingMessage::Request(request) => Some(&request.id),
            OutgoingMessage::Notification(_) => None,
        }
    }

    pub fn method(&self) -> &str {
        match self {
            OutgoingMessage::Request(request) => &request.method,
            OutgoingMessage::Notification(notification) => &notification.method,
        }
    }
}

/// The error object carried by a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(Value::from),
            message: message.into(),
            data: None,
        }
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Raw response envelope, before correlation and shape checks.
///
/// Fields are all optional here so that a non-conforming reply still decodes
/// and can be reported precisely instead of as a generic parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

/// A response that passed correlation and shape checks.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Result(Value),
    Error(ErrorObject),
}

/// Why a response envelope was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("response is missing an id (expected {expected})")]
    MissingId { expected: RequestId },
    #[error("response id {actual} does not match request id {expected}")]
    IdMismatch { expected: RequestId, actual: Value },
    #[error("response carries neither result nor error")]
    Empty,
    #[error("response carries both result and error")]
    Ambiguous,
    #[error("unsupported jsonrpc version {0}")]
    Version(String),
}

impl JsonRpcResponse {
    /// Checks the envelope answers `expected` and carries exactly one of
    /// `result` or `error`.
    pub fn into_payload(self, expected: &RequestId) -> Result<ResponsePayload, EnvelopeError> {
        if let Some(version) = &self.jsonrpc {
            if version != JSONRPC_VERSION {
                return Err(EnvelopeError::Version(version.clone()));
            }
        }

        match &self.id {
            None | Some(Value::Null) => {
                return Err(EnvelopeError::MissingId {
                    expected: expected.clone(),
                })
            }
            Some(id) if !expected.matches(id) => {
                return Err(EnvelopeError::IdMismatch {
                    expected: expected.clone(),
                    actual: id.clone(),
                })
            }
            Some(_) => {}
        }

        match (self.result, self.error) {
            (Some(result), None) => Ok(ResponsePayload::Result(result)),
            (None, Some(error)) => Ok(ResponsePayload::Error(error)),
            (None, None) => Err(EnvelopeError::Empty),
            (Some(_), Some(_)) => Err(EnvelopeError::Ambiguous),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Result of a successful `initialize`. Every field is optional so that
/// minimal servers which only advertise capabilities are still accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_info: Option<Implementation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}
