use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::process::ExitCode;
use std::time::Duration;

use crate::commands::info::handle_info;
use crate::commands::probe::handle_probe;
use crate::commands::tools::{handle_tools_call, handle_tools_list};
use crate::logging::setup_logging;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/mcp";

#[derive(Parser, Debug)]
#[command(name = "lookr", author, version, about = "Talk to an MCP tool server over HTTP", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    #[arg(
        long,
        global = true,
        env = "LOOKR_ENDPOINT",
        default_value = DEFAULT_ENDPOINT,
        help = "MCP endpoint URL"
    )]
    pub endpoint: String,

    #[arg(
        long,
        global = true,
        value_name = "SECS",
        default_value_t = 30,
        help = "Timeout for each request, in seconds"
    )]
    pub timeout: u64,

    #[arg(
        long = "header",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_key_val,
        action = clap::ArgAction::Append,
        help = "Extra HTTP header sent with every request (repeatable)"
    )]
    pub headers: Vec<(String, String)>,

    #[arg(short, long, global = true, help = "Log protocol traffic to stderr")]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn header_map(&self) -> HashMap<String, String> {
        self.headers.iter().cloned().collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Open a session and show what the server negotiated")]
    Info,

    #[command(about = "List or call tools")]
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },

    #[command(
        about = "Check an endpoint end to end",
        long_about = "Open a session, list the tools and optionally call one, then print a summary. Exits non-zero if any step failed."
    )]
    Probe {
        #[arg(long, value_name = "NAME", help = "Tool to call after listing")]
        call: Option<String>,

        #[command(flatten)]
        arguments: ToolArguments,
    },
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    #[command(about = "Print the tool catalog")]
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    #[command(about = "Invoke one tool")]
    Call {
        name: String,

        #[command(flatten)]
        arguments: ToolArguments,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ToolArguments {
    #[arg(
        long = "arg",
        value_name = "KEY=VALUE",
        value_parser = parse_key_val,
        action = clap::ArgAction::Append,
        help = "Tool argument; VALUE is parsed as JSON when possible (repeatable)"
    )]
    pub args: Vec<(String, String)>,

    #[arg(
        long = "json",
        value_name = "OBJECT",
        help = "Whole argument object as JSON; --arg entries override its keys"
    )]
    pub json: Option<String>,
}

impl ToolArguments {
    pub fn build(&self) -> Result<Map<String, Value>> {
        build_arguments(&self.args, self.json.as_deref())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid KEY=VALUE: {}", s)),
    }
}

/// `42`, `true` and `{"a":1}` become JSON values; anything else stays a string.
pub fn parse_arg_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn build_arguments(args: &[(String, String)], json: Option<&str>) -> Result<Map<String, Value>> {
    let mut arguments = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("--json is not valid JSON")? {
            Value::Object(map) => map,
            other => bail!("--json must be a JSON object, got {}", other),
        },
        None => Map::new(),
    };

    for (key, value) in args {
        arguments.insert(key.clone(), parse_arg_value(value));
    }
    Ok(arguments)
}

pub async fn cli() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.global.verbose)?;

    match cli.command {
        Command::Info => handle_info(&cli.global).await,
        Command::Tools { command } => match command {
            ToolsCommand::List { format } => handle_tools_list(&cli.global, format).await,
            ToolsCommand::Call { name, arguments } => {
                handle_tools_call(&cli.global, &name, arguments.build()?).await
            }
        },
        Command::Probe { call, arguments } => {
            let call = match call {
                Some(name) => Some((name, arguments.build()?)),
                None => None,
            };
            handle_probe(&cli.global, call).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("a=b", "a", "b" ; "simple")]
    #[test_case("a=", "a", "" ; "empty value")]
    #[test_case("url=http://x?y=z", "url", "http://x?y=z" ; "value containing equals")]
    fn test_parse_key_val(input: &str, key: &str, value: &str) {
        assert_eq!(
            parse_key_val(input).unwrap(),
            (key.to_string(), value.to_string())
        );
    }

    #[test_case("novalue" ; "missing equals")]
    #[test_case("=value" ; "missing key")]
    fn test_parse_key_val_rejects(input: &str) {
        assert!(parse_key_val(input).is_err());
    }

    #[test_case("42", json!(42) ; "number")]
    #[test_case("true", json!(true) ; "bool")]
    #[test_case("null", json!(null) ; "null")]
    #[test_case("[1,2]", json!([1, 2]) ; "array")]
    #[test_case("{\"a\":1}", json!({"a": 1}) ; "object")]
    #[test_case("thelook", json!("thelook") ; "bare word")]
    #[test_case("\"quoted\"", json!("quoted") ; "json string")]
    #[test_case("", json!("") ; "empty")]
    fn test_parse_arg_value(raw: &str, expected: Value) {
        assert_eq!(parse_arg_value(raw), expected);
    }

    #[test]
    fn test_build_arguments_merges_args_over_json() {
        let args = vec![
            ("model".to_string(), "ecommerce".to_string()),
            ("limit".to_string(), "10".to_string()),
        ];
        let arguments =
            build_arguments(&args, Some(r#"{"model": "thelook", "explore": "orders"}"#)).unwrap();

        assert_eq!(
            Value::Object(arguments),
            json!({"model": "ecommerce", "explore": "orders", "limit": 10})
        );
    }

    #[test_case("[1]" ; "array")]
    #[test_case("{not json" ; "malformed")]
    fn test_build_arguments_rejects_bad_json(raw: &str) {
        assert!(build_arguments(&[], Some(raw)).is_err());
    }

    #[test]
    fn test_cli_parses_tools_call() {
        let cli = Cli::try_parse_from([
            "lookr",
            "--endpoint",
            "http://toolbox:5000/mcp",
            "tools",
            "call",
            "get_explores",
            "--arg",
            "model=thelook",
            "--header",
            "Authorization=Bearer t",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.global.endpoint, "http://toolbox:5000/mcp");
        assert_eq!(cli.global.timeout(), Duration::from_secs(5));
        assert_eq!(
            cli.global.header_map().get("Authorization").map(String::as_str),
            Some("Bearer t")
        );
        match cli.command {
            Command::Tools {
                command: ToolsCommand::Call { name, arguments },
            } => {
                assert_eq!(name, "get_explores");
                assert_eq!(
                    Value::Object(arguments.build().unwrap()),
                    json!({"model": "thelook"})
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test_case(&["lookr", "tools", "list"], OutputFormat::Text ; "default text")]
    #[test_case(&["lookr", "tools", "list", "--format", "json"], OutputFormat::Json ; "json")]
    fn test_cli_parses_list_format(argv: &[&str], expected: OutputFormat) {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Tools {
                command: ToolsCommand::List { format },
            } => assert_eq!(format, expected),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_probe_without_call() {
        let cli = Cli::try_parse_from(["lookr", "probe"]).unwrap();
        match cli.command {
            Command::Probe { call, arguments } => {
                assert!(call.is_none());
                assert!(arguments.args.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_header() {
        assert!(Cli::try_parse_from(["lookr", "--header", "oops", "info"]).is_err());
    }
}
