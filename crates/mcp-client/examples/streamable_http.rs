use anyhow::Result;
use mcp_client::{ClientOptions, McpClient, McpClientTrait, StreamableHttpTransport};
use serde_json::Map;
use std::collections::HashMap;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mcp_client=debug".parse()?),
        )
        .init();

    let endpoint =
        std::env::var("MCP_ENDPOINT").unwrap_or_else(|_| "http://localhost:8080/mcp".to_string());

    let mut headers = HashMap::new();
    headers.insert(
        "User-Agent".to_string(),
        "mcp-client-example/1.0".to_string(),
    );
    let transport = StreamableHttpTransport::with_headers(endpoint, headers)?;

    let options = ClientOptions::default()
        .with_client_info("streamable-http-example", "1.0.0")
        .with_timeout(Duration::from_secs(10));
    let client = McpClient::open(transport, options).await?;
    println!("Connected: {:?}\n", client.session().server_info);

    let tools = client.list_tools().await?;
    for tool in &tools {
        println!("  {} - {}", tool.name, tool.description);
    }

    if let Some(tool) = tools.iter().find(|tool| tool.name == "get_models") {
        let result = client.call_tool(&tool.name, Map::new()).await?;
        println!("\n{} -> {:?}", tool.name, result);
    }

    Ok(())
}
