use crate::cli::GlobalArgs;
use crate::commands::connect;
use crate::output;
use anyhow::Result;
use mcp_client::McpClientTrait;
use std::process::ExitCode;

pub async fn handle_info(global: &GlobalArgs) -> Result<ExitCode> {
    let client = connect(global).await?;
    output::render_session(client.session());
    Ok(ExitCode::SUCCESS)
}
