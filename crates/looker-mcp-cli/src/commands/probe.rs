use crate::cli::GlobalArgs;
use crate::commands::connect;
use crate::output;
use anyhow::Result;
use mcp_client::McpClientTrait;
use mcp_core::ToolResult;
use serde_json::{Map, Value};
use std::process::ExitCode;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed(String),
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStep {
    pub name: &'static str,
    pub outcome: Outcome,
}

/// What one probe run found, step by step.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub endpoint: String,
    pub steps: Vec<ProbeStep>,
}

impl ProbeReport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        ProbeReport {
            endpoint: endpoint.into(),
            steps: Vec::new(),
        }
    }

    fn record(&mut self, name: &'static str, outcome: Outcome) {
        self.steps.push(ProbeStep { name, outcome });
    }

    pub fn succeeded(&self) -> bool {
        !self.steps.is_empty()
            && self
                .steps
                .iter()
                .all(|step| !matches!(step.outcome, Outcome::Failed(_)))
    }
}

/// Runs the steps after a successful open: list the catalog, then call
/// `call` if one was asked for.
pub async fn probe_session(
    client: &dyn McpClientTrait,
    call: Option<(String, Map<String, Value>)>,
    report: &mut ProbeReport,
) {
    let session = client.session();
    let server = session
        .server_info
        .as_ref()
        .map(|info| format!("{} {}", info.name, info.version))
        .unwrap_or_else(|| "unknown server".to_string());
    let version = session.protocol_version.as_deref().unwrap_or("unstated");
    report.record(
        "initialize",
        Outcome::Passed(format!("{} (protocol {})", server, version)),
    );

    match client.list_tools().await {
        Ok(tools) => {
            let names: Vec<&str> = tools.iter().map(|tool| tool.name.as_str()).collect();
            let summary = if names.is_empty() {
                "0 tools".to_string()
            } else {
                format!("{} tools: {}", names.len(), names.join(", "))
            };
            report.record("tools/list", Outcome::Passed(summary));
        }
        Err(e) => report.record("tools/list", Outcome::Failed(e.to_string())),
    }

    if let Some((name, arguments)) = call {
        let outcome = match client.call_tool(&name, arguments).await {
            Ok(ToolResult::Success { .. }) => Outcome::Passed(format!("{} succeeded", name)),
            Ok(ToolResult::Failure(failure)) => {
                Outcome::Failed(format!("{} failed: {}", name, failure))
            }
            Err(e) => Outcome::Failed(format!("{} failed: {}", name, e)),
        };
        report.record("tools/call", outcome);
    }
}

pub async fn handle_probe(
    global: &GlobalArgs,
    call: Option<(String, Map<String, Value>)>,
) -> Result<ExitCode> {
    let mut report = ProbeReport::new(&global.endpoint);

    match connect(global).await {
        Ok(client) => probe_session(&client, call, &mut report).await,
        Err(e) => {
            report.record("initialize", Outcome::Failed(format!("{:#}", e)));
            report.record("tools/list", Outcome::Skipped);
            if call.is_some() {
                report.record("tools/call", Outcome::Skipped);
            }
        }
    }

    output::render_probe(&report);
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
