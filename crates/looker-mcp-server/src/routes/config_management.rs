use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const NOT_SET: &str = "NOT_SET";
const MASK: &str = "***";

/// Configuration as reported over HTTP. Secrets never leave the process.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConfigStatus {
    pub looker_base_url: String,
    pub looker_client_id: String,
    pub looker_client_secret: String,
    pub looker_verify_ssl: bool,
    pub looker_api_version: String,
    pub configured: bool,
    pub toolbox_forwarding: bool,
}

fn masked(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_SET.to_string()
    } else {
        MASK.to_string()
    }
}

impl ConfigStatus {
    fn from_state(state: &AppState) -> Self {
        let looker = &state.looker;
        ConfigStatus {
            looker_base_url: if looker.base_url.trim().is_empty() {
                NOT_SET.to_string()
            } else {
                looker.base_url.clone()
            },
            looker_client_id: masked(&looker.client_id),
            looker_client_secret: masked(&looker.client_secret),
            looker_verify_ssl: looker.verify_ssl,
            looker_api_version: looker.api_version.clone(),
            configured: state.readiness.is_configured(),
            toolbox_forwarding: state.toolbox.is_some(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/config",
    responses(
        (status = 200, description = "Masked configuration", body = ConfigStatus)
    )
)]
pub async fn read_config(State(state): State<Arc<AppState>>) -> Json<ConfigStatus> {
    Json(ConfigStatus::from_state(&state))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/config", get(read_config))
        .with_state(state)
}
