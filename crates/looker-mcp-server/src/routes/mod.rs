pub mod config_management;
pub mod health;
pub mod mcp;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;

/// Configure all routes on a single router
pub fn configure(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes(state.clone()))
        .merge(config_management::routes(state.clone()))
        .merge(mcp::routes(state))
}
