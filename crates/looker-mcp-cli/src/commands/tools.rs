use crate::cli::{GlobalArgs, OutputFormat};
use crate::commands::connect;
use crate::output;
use anyhow::Result;
use mcp_client::McpClientTrait;
use mcp_core::ToolResult;
use serde_json::{Map, Value};
use std::process::ExitCode;

pub async fn handle_tools_list(global: &GlobalArgs, format: OutputFormat) -> Result<ExitCode> {
    let client = connect(global).await?;
    let tools = client.list_tools().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tools)?),
        OutputFormat::Text => output::render_tools(&tools),
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn handle_tools_call(
    global: &GlobalArgs,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<ExitCode> {
    let client = connect(global).await?;
    let result = client.call_tool(name, arguments).await?;
    output::render_tool_result(name, &result);
    Ok(exit_code(&result))
}

/// Failure results and results the tool itself flagged with `isError` exit non-zero.
pub fn exit_code(result: &ToolResult) -> ExitCode {
    let flagged = result.content().is_some_and(|content| content.is_error);
    if result.is_success() && !flagged {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_core::ToolFailure;
    use serde_json::json;

    #[test]
    fn test_exit_code_follows_result() {
        let ok = ToolResult::success(json!({"content": [{"type": "text", "text": "3 models"}]}));
        assert_eq!(exit_code(&ok), ExitCode::SUCCESS);

        let flagged = ToolResult::success(json!({"content": [], "isError": true}));
        assert_eq!(exit_code(&flagged), ExitCode::FAILURE);

        let failed = ToolResult::failure(ToolFailure::server("unknown tool", None));
        assert_eq!(exit_code(&failed), ExitCode::FAILURE);

        // payloads that are not call results still count as success
        let raw = ToolResult::success(json!(["a", "b"]));
        assert_eq!(exit_code(&raw), ExitCode::SUCCESS);
    }
}
