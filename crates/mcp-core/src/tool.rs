/// Tools exposed by a tool-server and the outcome of invoking them.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One entry of the server's tool catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Opaque validation metadata; the client never interprets it.
    #[serde(default = "empty_object")]
    pub input_schema: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Tool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A single request to execute one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Map<String, Value>) -> Self {
        ToolCall {
            name: name.into(),
            arguments,
        }
    }
}

/// One page of `tools/list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// A content item in a `tools/call` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Content {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: Value,
    },
    #[serde(other)]
    Unknown,
}

/// Typed view over a successful `tools/call` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Concatenated text items, one per line.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Where a tool failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureOrigin {
    /// The server answered with an error object.
    Server,
    /// The request never produced a well-formed answer (timeout, refused
    /// connection, non-2xx status).
    Transport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    pub origin: FailureOrigin,
}

impl ToolFailure {
    pub fn server(message: impl Into<String>, code: Option<Value>) -> Self {
        ToolFailure {
            message: message.into(),
            code,
            origin: FailureOrigin::Server,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ToolFailure {
            message: message.into(),
            code: None,
            origin: FailureOrigin::Transport,
        }
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Classified outcome of a tool invocation. Tool failures are expected and
/// are returned as data rather than as errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success { payload: Value },
    Failure(ToolFailure),
}

impl ToolResult {
    pub fn success(payload: Value) -> Self {
        ToolResult::Success { payload }
    }

    pub fn failure(failure: ToolFailure) -> Self {
        ToolResult::Failure(failure)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            ToolResult::Success { payload } => Some(payload),
            ToolResult::Failure(_) => None,
        }
    }

    pub fn failure_ref(&self) -> Option<&ToolFailure> {
        match self {
            ToolResult::Success { .. } => None,
            ToolResult::Failure(failure) => Some(failure),
        }
    }

    /// Decodes the success payload as a standard `CallToolResult`, if it is one.
    pub fn content(&self) -> Option<CallToolResult> {
        self.payload()
            .and_then(|payload| serde_json::from_value(payload.clone()).ok())
    }
}
