use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about = "HTTP front for a Looker MCP toolbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default)
    Serve {
        /// Exit instead of starting degraded when Looker credentials are missing
        #[arg(long)]
        require_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve { require_config }) => {
            looker_mcp_server::commands::serve::run(require_config).await
        }
        None => looker_mcp_server::commands::serve::run(false).await,
    }
}
