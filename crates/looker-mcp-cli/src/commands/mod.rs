pub mod info;
pub mod probe;
pub mod tools;

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use mcp_client::{ClientOptions, McpClient, StreamableHttpTransport};
use tracing::debug;

/// Opens a session against the endpoint named on the command line.
pub async fn connect(global: &GlobalArgs) -> Result<McpClient<StreamableHttpTransport>> {
    let transport = StreamableHttpTransport::with_headers(&global.endpoint, global.header_map())
        .with_context(|| format!("invalid endpoint {}", global.endpoint))?;
    let options = ClientOptions::default()
        .with_timeout(global.timeout())
        .with_client_info("lookr", env!("CARGO_PKG_VERSION"));

    debug!(endpoint = %global.endpoint, "opening session");
    McpClient::open(transport, options)
        .await
        .with_context(|| format!("failed to open a session with {}", global.endpoint))
}
