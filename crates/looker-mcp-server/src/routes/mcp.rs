use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use mcp_core::protocol::{ErrorObject, INTERNAL_ERROR, JSONRPC_VERSION};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const FORWARDED_REQUEST_HEADERS: &[&str] = &[
    "content-type",
    "accept",
    "authorization",
    "mcp-session-id",
    "mcp-protocol-version",
];

const FORWARDED_RESPONSE_HEADERS: &[&str] = &["content-type", "mcp-session-id"];

/// Error envelope answering the request in `body`, echoing its id when it has one.
fn jsonrpc_error(status: StatusCode, body: &[u8], message: String) -> Response {
    let id = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|request| request.get("id").cloned())
        .unwrap_or(Value::Null);
    let error = ErrorObject::new(Some(INTERNAL_ERROR), message);

    (
        status,
        Json(json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "error": error,
        })),
    )
        .into_response()
}

/// Relays an MCP request to the toolbox unchanged and returns its reply.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(toolbox) = state.toolbox.as_ref() else {
        return jsonrpc_error(
            StatusCode::SERVICE_UNAVAILABLE,
            &body,
            "No toolbox is configured for this server (set TOOLBOX_URL)".to_string(),
        );
    };

    let mut forwarded = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = headers.get(*name) {
            forwarded.insert(*name, value.clone());
        }
    }

    let request = toolbox
        .http_client
        .post(&toolbox.url)
        .headers(forwarded)
        .body(body.clone());

    let upstream = match request.send().await {
        Ok(upstream) => upstream,
        Err(e) => {
            warn!("Toolbox at {} unreachable: {}", toolbox.url, e);
            return jsonrpc_error(
                StatusCode::BAD_GATEWAY,
                &body,
                format!("Toolbox unreachable: {}", e),
            );
        }
    };

    let status = upstream.status();
    let mut response_headers = HeaderMap::new();
    for name in FORWARDED_RESPONSE_HEADERS {
        if let Some(value) = upstream.headers().get(*name) {
            response_headers.insert(*name, value.clone());
        }
    }

    match upstream.bytes().await {
        Ok(bytes) => {
            debug!(status = status.as_u16(), len = bytes.len(), "Relayed toolbox reply");
            (status, response_headers, bytes).into_response()
        }
        Err(e) => jsonrpc_error(
            StatusCode::BAD_GATEWAY,
            &body,
            format!("Failed to read toolbox reply: {}", e),
        ),
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mcp", post(forward))
        .route("/mcp/", post(forward))
        .with_state(state)
}
