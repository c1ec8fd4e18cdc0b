use mcp_core::protocol::{
    ErrorObject, Implementation, InitializeResult, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, OutgoingMessage, RequestId, ResponsePayload, LATEST_PROTOCOL_VERSION,
    METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
};
use mcp_core::tool::{ListToolsResult, Tool, ToolFailure, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tower::{timeout::Timeout, Service, ServiceExt};
use tracing::{debug, warn};

use crate::transport::{self, BoxError, Transport, TransportRequest, TransportResponse};
use crate::McpService;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for MCP client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a well-formed answer: unreachable host,
    /// timeout, TLS failure or a non-2xx status.
    #[error("Connection error: {message}")]
    Connection { status: Option<u16>, message: String },

    #[error("Negotiation rejected by server: {0}")]
    Negotiation(ErrorObject),

    /// The server answered but not in the expected envelope.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("RPC error: {0}")]
    Rpc(ErrorObject),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<transport::Error> for Error {
    fn from(err: transport::Error) -> Self {
        match err {
            transport::Error::HttpError { status, message } => {
                let message = if message.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    format!("HTTP {}: {}", status, message.trim())
                };
                Error::Connection {
                    status: Some(status),
                    message,
                }
            }
            transport::Error::Serialization(e) => Error::Serialization(e),
            other => Error::Connection {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<BoxError> for Error {
    fn from(err: BoxError) -> Self {
        if err.is::<tower::timeout::error::Elapsed>() {
            return Error::Connection {
                status: None,
                message: "Request timed out".to_string(),
            };
        }
        match err.downcast::<transport::Error>() {
            Ok(err) => (*err).into(),
            Err(err) => Error::Connection {
                status: None,
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        ClientInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Capabilities declared by the client in `initialize`. Sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientCapabilities(pub Map<String, Value>);

#[derive(Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
}

/// Settings fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub client_info: ClientInfo,
    pub capabilities: ClientCapabilities,
    pub protocol_version: String,
    /// Upper bound on every individual round-trip.
    pub timeout: Duration,
    /// Send `notifications/initialized` after a successful `initialize`.
    pub send_initialized: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            client_info: ClientInfo::default(),
            capabilities: ClientCapabilities::default(),
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            send_initialized: true,
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_info = ClientInfo {
            name: name.into(),
            version: version.into(),
        };
        self
    }

    pub fn without_initialized_notification(mut self) -> Self {
        self.send_initialized = false;
        self
    }
}

/// The negotiated context of one connection. Immutable once opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub endpoint: String,
    /// The version the server answered with, if it stated one.
    pub protocol_version: Option<String>,
    pub capabilities: Map<String, Value>,
    pub server_info: Option<Implementation>,
    pub instructions: Option<String>,
    pub client_info: ClientInfo,
    /// Transport-level session token issued by the server at negotiation.
    #[serde(skip)]
    pub transport_session: Option<String>,
}

impl Session {
    pub fn supports_tools(&self) -> bool {
        self.capabilities.contains_key("tools")
    }
}

#[async_trait::async_trait]
pub trait McpClientTrait: Send + Sync {
    fn session(&self) -> &Session;

    async fn list_tools_page(&self, cursor: Option<String>) -> Result<ListToolsResult, Error>;

    async fn list_tools(&self) -> Result<Vec<Tool>, Error>;

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>)
        -> Result<ToolResult, Error>;
}

/// The MCP client is the interface for MCP operations.
pub struct McpClient<T>
where
    T: Transport,
{
    service: Timeout<McpService<T>>,
    session: Session,
}

impl<T> McpClient<T>
where
    T: Transport,
{
    /// Negotiates a session with the server behind `transport`.
    pub async fn open(transport: T, options: ClientOptions) -> Result<Self, Error> {
        let service = McpService::with_timeout(transport, options.timeout);
        let endpoint = service.get_ref().endpoint().to_string();

        let params = InitializeParams {
            protocol_version: options.protocol_version.clone(),
            capabilities: options.capabilities.clone(),
            client_info: options.client_info.clone(),
        };
        let request = JsonRpcRequest::new(METHOD_INITIALIZE, Some(to_object(&params)?));
        let id = request.id.clone();

        debug!(id = %id, endpoint = %endpoint, "Initializing session");
        let response = dispatch(&service, OutgoingMessage::Request(request), None).await?;
        let transport_session = response.session_id.clone();

        let result: InitializeResult = match decode_response(&id, &response)? {
            ResponsePayload::Error(error) => return Err(Error::Negotiation(error)),
            ResponsePayload::Result(value) => serde_json::from_value(value)
                .map_err(|e| Error::Protocol(format!("Invalid initialize result: {}", e)))?,
        };

        let session = Session {
            endpoint,
            protocol_version: result.protocol_version,
            capabilities: result.capabilities,
            server_info: result.server_info,
            instructions: result.instructions,
            client_info: options.client_info,
            transport_session,
        };

        let client = Self { service, session };

        if options.send_initialized {
            let notification = JsonRpcNotification::new(METHOD_INITIALIZED);
            if let Err(e) = client
                .dispatch(OutgoingMessage::Notification(notification))
                .await
            {
                warn!("Failed to deliver initialized notification: {}", e);
            }
        }

        Ok(client)
    }

    async fn dispatch(&self, message: OutgoingMessage) -> Result<TransportResponse, Error> {
        dispatch(
            &self.service,
            message,
            self.session.transport_session.clone(),
        )
        .await
    }

    /// Send a JSON-RPC request and return its correlated payload.
    async fn send_request(
        &self,
        method: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<ResponsePayload, Error> {
        let request = JsonRpcRequest::new(method, params);
        let id = request.id.clone();
        debug!(id = %id, method, "Sending request");

        let response = self.dispatch(OutgoingMessage::Request(request)).await?;
        decode_response(&id, &response)
    }
}

#[async_trait::async_trait]
impl<T> McpClientTrait for McpClient<T>
where
    T: Transport,
{
    fn session(&self) -> &Session {
        &self.session
    }

    async fn list_tools_page(&self, cursor: Option<String>) -> Result<ListToolsResult, Error> {
        let params = cursor.map(|cursor| {
            let mut params = Map::new();
            params.insert("cursor".to_string(), Value::String(cursor));
            params
        });

        match self.send_request(METHOD_TOOLS_LIST, params).await? {
            ResponsePayload::Result(value) => serde_json::from_value(value)
                .map_err(|e| Error::Protocol(format!("Invalid tools/list result: {}", e))),
            ResponsePayload::Error(error) => Err(Error::Rpc(error)),
        }
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, Error> {
        let mut tools = Vec::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor = None;

        loop {
            let page = self.list_tools_page(cursor).await?;
            tools.extend(page.tools);

            match page.next_cursor {
                Some(next) if !next.is_empty() => {
                    if !seen_cursors.insert(next.clone()) {
                        return Err(Error::Protocol(format!(
                            "Server repeated tools/list cursor '{}'",
                            next
                        )));
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        debug!(count = tools.len(), "Fetched tool catalog");
        Ok(tools)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolResult, Error> {
        let mut params = Map::new();
        params.insert("name".to_string(), Value::String(name.to_string()));
        params.insert("arguments".to_string(), Value::Object(arguments));

        match self.send_request(METHOD_TOOLS_CALL, Some(params)).await {
            Ok(ResponsePayload::Result(payload)) => Ok(ToolResult::success(payload)),
            Ok(ResponsePayload::Error(error)) => Ok(ToolResult::failure(ToolFailure::server(
                error.message,
                error.code,
            ))),
            Err(Error::Connection { message, .. }) => {
                warn!(tool = name, "Tool call failed in transport: {}", message);
                Ok(ToolResult::failure(ToolFailure::transport(message)))
            }
            Err(e) => Err(e),
        }
    }
}

async fn dispatch<T: Transport>(
    service: &Timeout<McpService<T>>,
    message: OutgoingMessage,
    session_id: Option<String>,
) -> Result<TransportResponse, Error> {
    // Cloned per call; the stack holds no per-call state.
    let mut service = service.clone();
    service.ready().await?;
    let response = service
        .call(TransportRequest {
            message,
            session_id,
        })
        .await?;
    Ok(response)
}

/// Checks a reply is a JSON-RPC response to `id` with exactly one of
/// `result` or `error`.
fn decode_response(id: &RequestId, response: &TransportResponse) -> Result<ResponsePayload, Error> {
    let body = response.body.trim();
    if body.is_empty() {
        return Err(Error::Protocol(format!(
            "Empty response body for request {}",
            id
        )));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::Protocol(format!("Malformed response body: {}", e)))?;
    if !value.is_object() {
        return Err(Error::Protocol(
            "Response body is not a JSON object".to_string(),
        ));
    }

    let envelope: JsonRpcResponse = serde_json::from_value(value)
        .map_err(|e| Error::Protocol(format!("Malformed response envelope: {}", e)))?;
    envelope
        .into_payload(id)
        .map_err(|e| Error::Protocol(e.to_string()))
}

fn to_object<S: Serialize>(value: &S) -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Protocol("Request params must be an object".to_string())),
    }
}
