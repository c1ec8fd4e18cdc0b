use crate::transport::{Error, Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use std::collections::HashMap;
use tokio::time::Duration;
use tracing::{debug, warn};
use url::Url;

// Bounds only the TCP/TLS handshake; the per-call deadline is enforced by the
// client's timeout layer.
const CONNECT_TIMEOUT_SECS: u64 = 10;

pub const SESSION_ID_HEADER: &str = "Mcp-Session-Id";

/// HTTP POST transport: every message is one POST to a single endpoint.
///
/// Replies are expected as `application/json`. A server that answers with
/// `text/event-stream` instead is tolerated; the JSON-RPC response is taken
/// from the stream's `data:` events.
#[derive(Clone)]
pub struct StreamableHttpTransport {
    mcp_endpoint: String,
    http_client: HttpClient,
    headers: HashMap<String, String>,
}

impl StreamableHttpTransport {
    pub fn new<S: Into<String>>(mcp_endpoint: S) -> Result<Self, Error> {
        Self::with_headers(mcp_endpoint, HashMap::new())
    }

    pub fn with_headers<S: Into<String>>(
        mcp_endpoint: S,
        headers: HashMap<String, String>,
    ) -> Result<Self, Error> {
        let mcp_endpoint = mcp_endpoint.into();
        Self::validate_endpoint(&mcp_endpoint)?;

        let http_client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            mcp_endpoint,
            http_client,
            headers,
        })
    }

    /// Validate that the URL is a usable http(s) endpoint
    pub fn validate_endpoint(endpoint: &str) -> Result<(), Error> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidEndpoint(format!(
                "{}: unsupported scheme '{}'",
                endpoint, scheme
            ))),
        }
    }
}

#[async_trait]
impl Transport for StreamableHttpTransport {
    fn endpoint(&self) -> &str {
        &self.mcp_endpoint
    }

    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        let body = serde_json::to_string(&request.message)?;
        debug!(method = request.message.method(), "POST {}", self.mcp_endpoint);

        let mut builder = self
            .http_client
            .post(&self.mcp_endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);

        if let Some(session_id) = request.session_id.as_deref() {
            builder = builder.header(SESSION_ID_HEADER, session_id);
        }

        for (key, value) in &self.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let status = response.status();
        let session_id = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::HttpError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = if is_event_stream {
            select_event_data(&text).unwrap_or_else(|| {
                warn!("Event stream reply carried no data events");
                String::new()
            })
        } else {
            text
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
            session_id,
        })
    }
}

/// Picks the JSON-RPC response out of an event-stream body.
///
/// Servers may interleave notifications before the response, so the first
/// event whose data is an object with an `id` wins; otherwise the first
/// event's data is returned as-is and left for the caller to reject.
fn select_event_data(stream: &str) -> Option<String> {
    let mut events = Vec::new();
    let mut data = String::new();

    for line in stream.lines().chain(std::iter::once("")) {
        if line.is_empty() {
            if !data.is_empty() {
                events.push(std::mem::take(&mut data));
            }
        } else if let Some(field) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(field.strip_prefix(' ').unwrap_or(field));
        }
        // event:, id: and retry: fields carry nothing we need
    }

    events
        .iter()
        .find(|event| {
            serde_json::from_str::<serde_json::Value>(event)
                .map(|value| value.get("id").is_some())
                .unwrap_or(false)
        })
        .or_else(|| events.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        assert!(StreamableHttpTransport::validate_endpoint("http://localhost:8080/mcp").is_ok());
        assert!(StreamableHttpTransport::validate_endpoint("https://looker.example.com/mcp/").is_ok());
        assert!(matches!(
            StreamableHttpTransport::validate_endpoint("not a url"),
            Err(Error::InvalidEndpoint(_))
        ));
        assert!(matches!(
            StreamableHttpTransport::validate_endpoint("ftp://example.com/mcp"),
            Err(Error::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_select_event_data_skips_notifications() {
        let stream = "event: message\n\
                      data: {\"jsonrpc\":\"2.0\",\"method\":\"notifications/progress\"}\n\
                      \n\
                      event: message\n\
                      data: {\"jsonrpc\":\"2.0\",\"id\":\"a\",\"result\":{}}\n\
                      \n";
        assert_eq!(
            select_event_data(stream).as_deref(),
            Some("{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"result\":{}}")
        );
    }

    #[test]
    fn test_select_event_data_joins_multiline_data() {
        let stream = "data: {\"jsonrpc\":\"2.0\",\ndata: \"id\":\"a\",\"result\":{}}";
        assert_eq!(
            select_event_data(stream).as_deref(),
            Some("{\"jsonrpc\":\"2.0\",\n\"id\":\"a\",\"result\":{}}")
        );
    }

    #[test]
    fn test_select_event_data_without_events() {
        assert_eq!(select_event_data(": keep-alive\n\n"), None);
        assert_eq!(select_event_data(""), None);
    }
}
