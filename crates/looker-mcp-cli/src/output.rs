use crate::commands::probe::{Outcome, ProbeReport};
use console::style;
use mcp_client::Session;
use mcp_core::{FailureOrigin, Tool, ToolResult};

pub fn render_error(message: &str) {
    eprintln!("  {} {}", style("error:").red().bold(), message);
}

pub fn render_session(session: &Session) {
    println!("{} {}", style("endpoint:").dim(), session.endpoint);
    match &session.server_info {
        Some(info) => println!(
            "{} {} {}",
            style("server:").dim(),
            style(&info.name).cyan().bold(),
            info.version
        ),
        None => println!("{} {}", style("server:").dim(), style("not stated").dim()),
    }
    println!(
        "{} {}",
        style("protocol:").dim(),
        session.protocol_version.as_deref().unwrap_or("not stated")
    );
    if let Some(id) = &session.transport_session {
        println!("{} {}", style("session id:").dim(), id);
    }
    println!(
        "{} {}",
        style("capabilities:").dim(),
        serde_json::to_string_pretty(&session.capabilities).unwrap_or_default()
    );
    if let Some(instructions) = &session.instructions {
        println!("\n{}\n{}", style("instructions:").dim(), instructions);
    }
}

pub fn render_tools(tools: &[Tool]) {
    if tools.is_empty() {
        println!("{}", style("The server offers no tools.").yellow());
        return;
    }
    for tool in tools {
        if tool.description.is_empty() {
            println!("{}", style(&tool.name).cyan().bold());
        } else {
            println!(
                "{}  {}",
                style(&tool.name).cyan().bold(),
                style(&tool.description).dim()
            );
        }
    }
}

pub fn render_tool_result(name: &str, result: &ToolResult) {
    match result {
        ToolResult::Success { payload } => {
            let content = result.content();
            let text = content.as_ref().map(|c| c.text()).unwrap_or_default();
            if content.as_ref().is_some_and(|c| c.is_error) {
                eprintln!("{} {}", style(name).red(), style("reported an error").red());
            }
            if text.is_empty() {
                println!(
                    "{}",
                    serde_json::to_string_pretty(payload).unwrap_or_default()
                );
            } else {
                println!("{}", text);
            }
        }
        ToolResult::Failure(failure) => {
            let origin = match failure.origin {
                FailureOrigin::Server => "rejected by server",
                FailureOrigin::Transport => "did not complete",
            };
            render_error(&format!("{} {}: {}", name, origin, failure));
        }
    }
}

pub fn render_probe(report: &ProbeReport) {
    println!("{} {}", style("probe").bold(), report.endpoint);
    for step in &report.steps {
        match &step.outcome {
            Outcome::Passed(detail) => {
                println!("  {} {:<11} {}", style("ok").green(), step.name, detail)
            }
            Outcome::Failed(detail) => {
                println!("  {} {:<11} {}", style("FAIL").red().bold(), step.name, detail)
            }
            Outcome::Skipped => println!(
                "  {} {:<11}",
                style("skip").yellow(),
                style(step.name).dim()
            ),
        }
    }
    if report.succeeded() {
        println!("{}", style("all steps passed").green());
    } else {
        println!("{}", style("probe failed").red().bold());
    }
}
