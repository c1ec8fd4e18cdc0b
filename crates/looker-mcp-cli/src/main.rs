use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match looker_mcp_cli::cli::cli().await {
        Ok(code) => code,
        Err(e) => {
            looker_mcp_cli::output::render_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
