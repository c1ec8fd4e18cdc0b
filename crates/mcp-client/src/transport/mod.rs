use async_trait::async_trait;
use mcp_core::protocol::OutgoingMessage;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// A generic error type for transport operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },
}

/// A message to deliver, plus the server-issued session token to replay.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub message: OutgoingMessage,
    pub session_id: Option<String>,
}

/// A successful (2xx) reply. `body` holds the JSON text of the reply, already
/// unwrapped from an event stream when the server chose to stream it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
    pub session_id: Option<String>,
}

/// A request/response transport: one outbound message, one reply.
///
/// Implementations must return `Error::HttpError` for non-2xx replies and
/// must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync + Clone + 'static {
    /// Where messages are delivered, used for the session record and logs.
    fn endpoint(&self) -> &str;

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error>;
}

pub mod streamable_http;
pub use streamable_http::StreamableHttpTransport;
