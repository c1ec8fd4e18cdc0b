use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub const TOOLBOX_NAME: &str = "Looker";

/// Tools the toolbox's prebuilt Looker configuration provides.
pub const PREBUILT_TOOLS: &[&str] = &[
    "get_models",
    "get_explores",
    "get_dimensions",
    "get_measures",
    "get_filters",
    "get_parameters",
    "query",
    "query_sql",
    "query_url",
    "get_looks",
    "run_look",
    "make_look",
];

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when Looker credentials are configured, "error" otherwise
    pub status: String,
    pub toolbox: String,
    pub version: String,
    pub configured: bool,
    pub message: String,
}

impl HealthResponse {
    fn from_state(state: &AppState) -> Self {
        let configured = state.readiness.is_configured();
        HealthResponse {
            status: if configured { "ok" } else { "error" }.to_string(),
            toolbox: TOOLBOX_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            configured,
            message: if configured {
                "Looker MCP Toolbox - 15 prebuilt tools available".to_string()
            } else {
                "Missing Looker credentials".to_string()
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server status", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}

#[utoipa::path(
    get,
    path = "/service/health",
    responses(
        (status = 200, description = "Server status for load balancers", body = HealthResponse)
    )
)]
pub async fn service_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Plain-text information page", body = String)
    )
)]
pub async fn info(State(state): State<Arc<AppState>>) -> String {
    let status = if state.readiness.is_configured() {
        "Ready".to_string()
    } else {
        format!(
            "Not Configured - Set environment variables ({})",
            state.readiness.missing.join(", ")
        )
    };

    format!(
        "Looker MCP Server\n\
         ================\n\n\
         Endpoints:\n  \
         GET  /               - This information page\n  \
         GET  /health         - Health check endpoint\n  \
         GET  /service/health - Health check endpoint\n  \
         GET  /config         - Configuration status (masked)\n  \
         POST /mcp/           - MCP protocol endpoint\n\n\
         Status: {status}\n\n\
         Prebuilt Looker Tools:\n  \
         - {tools}\n\n\
         Note: All tools are provided by the toolbox's prebuilt Looker configuration\n",
        status = status,
        tools = PREBUILT_TOOLS.join(", "),
    )
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/health", get(health))
        .route("/service/health", get(service_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::LookerConfig;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn configured() -> LookerConfig {
        LookerConfig {
            base_url: "https://example.looker.com".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            ..Default::default()
        }
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_when_configured() {
        let state = AppState::new(configured(), None).unwrap();
        for uri in ["/health", "/service/health"] {
            let (status, body) = get_body(routes(state.clone()), uri).await;
            assert_eq!(status, StatusCode::OK);

            let health: HealthResponse = serde_json::from_str(&body).unwrap();
            assert_eq!(health.status, "ok");
            assert_eq!(health.toolbox, "Looker");
            assert!(health.configured);
            assert_eq!(health.message, "Looker MCP Toolbox - 15 prebuilt tools available");
        }
    }

    #[tokio::test]
    async fn test_health_when_missing_credentials() {
        let state = AppState::new(LookerConfig::default(), None).unwrap();
        let (status, body) = get_body(routes(state), "/health").await;

        // degraded, not down
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, "error");
        assert!(!health.configured);
        assert_eq!(health.message, "Missing Looker credentials");
    }

    #[tokio::test]
    async fn test_info_page_lists_endpoints_and_status() {
        let state = AppState::new(configured(), None).unwrap();
        let (status, body) = get_body(routes(state), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Looker MCP Server\n"));
        assert!(body.contains("GET  /service/health"));
        assert!(body.contains("Status: Ready"));
        assert!(body.contains("run_look"));

        let state = AppState::new(LookerConfig::default(), None).unwrap();
        let (_, body) = get_body(routes(state), "/").await;
        assert!(body.contains("Not Configured"));
        assert!(body.contains("LOOKER_CLIENT_SECRET"));
    }
}
