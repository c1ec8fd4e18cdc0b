use crate::configuration::{LookerConfig, Settings};
use crate::state::AppState;
use anyhow::{bail, Result};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub async fn run(require_config: bool) -> Result<()> {
    // A missing .env file is normal in containers.
    let _ = dotenvy::dotenv();

    let settings = Settings::new()?;
    crate::logging::setup_logging(settings.json_logs())?;

    let looker = LookerConfig::from_env()?;
    if let Err(e) = looker.validate() {
        if require_config {
            bail!(e);
        }
        warn!("{}; serving in degraded mode", e);
    }

    match settings.toolbox_url.as_deref() {
        Some(url) => info!("forwarding /mcp to toolbox at {}", url),
        None => warn!("TOOLBOX_URL is not set; /mcp will answer 503"),
    }

    let app_state = AppState::new(looker, settings.toolbox_url.clone())?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = crate::routes::configure(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::signal::shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
