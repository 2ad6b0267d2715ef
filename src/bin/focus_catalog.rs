//! FOCUS Catalog Command Line Interface
//!
//! Runs catalog tools from a shell and prints the JSON envelope on stdout.
//! Logs go to stderr; set `RUST_LOG=focus_catalog=debug` for load details.
//!
//! # Usage
//!
//! ```bash
//! # List use cases for the configured version
//! focus_catalog use-cases
//!
//! # Prepare a use case with positional parameters
//! focus_catalog prepare --use-case cost-by-service --params '["2025-01-01", "2025-02-01"]'
//!
//! # Mandatory metric columns in FOCUS 1.2
//! focus_catalog columns --version 1.2 --feature-level mandatory --column-type metric
//!
//! # Call any tool by name
//! focus_catalog call get_focus_versions
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use focus_catalog::tools::all_tool_specs;
use focus_catalog::{dispatch_tool, CatalogConfig, FocusCatalog, ToolContext};

#[derive(Parser)]
#[command(name = "focus_catalog")]
#[command(about = "Query FOCUS use cases and specification metadata")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding queries/ and specifications/
    #[arg(long, global = true, env = "FOCUS_RESOURCES_DIR")]
    resources_dir: Option<PathBuf>,

    /// Default FOCUS version for requests that do not name one
    #[arg(long, global = true, env = "FOCUS_VERSION")]
    focus_version: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List predefined use cases
    UseCases {
        #[arg(long)]
        version: Option<String>,
    },

    /// Show one use case with its SQL and parameter count
    UseCase {
        /// Use case id or slug
        id: String,

        #[arg(long)]
        version: Option<String>,
    },

    /// Prepare custom SQL or a use case for execution
    Prepare {
        #[arg(long, conflicts_with = "use_case")]
        query: Option<String>,

        #[arg(long)]
        use_case: Option<String>,

        /// JSON list (or numbered object) of parameter values
        #[arg(long)]
        params: Option<String>,

        #[arg(long, conflicts_with = "no_limit")]
        limit: Option<u32>,

        /// Do not append a LIMIT clause
        #[arg(long)]
        no_limit: bool,

        #[arg(long)]
        version: Option<String>,
    },

    /// List column definitions
    Columns {
        #[arg(long)]
        version: Option<String>,

        /// Mandatory, Conditional, Optional or Recommended
        #[arg(long)]
        feature_level: Option<String>,

        /// Dimension or Metric
        #[arg(long)]
        column_type: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    /// List attribute definitions
    Attributes {
        #[arg(long)]
        version: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    /// Look up one column by id or display name
    Column {
        id: String,

        #[arg(long)]
        version: Option<String>,
    },

    /// Look up one attribute by id or name
    Attribute {
        id: String,

        #[arg(long)]
        version: Option<String>,
    },

    /// List known specification versions
    Versions,

    /// Show configuration and load summary
    Info,

    /// List tool descriptions
    Tools,

    /// Call a tool by name with raw JSON arguments
    Call {
        tool: String,

        #[arg(long, default_value = "{}")]
        args: String,
    },
}

impl Commands {
    /// Tool name and JSON arguments for this command
    fn into_call(self) -> Result<(String, Value)> {
        let call = match self {
            Commands::UseCases { version } => ("list_use_cases", object([("version", text(version))])),
            Commands::UseCase { id, version } => (
                "get_use_case",
                object([("use_case_id", text(Some(id))), ("version", text(version))]),
            ),
            Commands::Prepare {
                query,
                use_case,
                params,
                limit,
                no_limit,
                version,
            } => {
                let parameters = params
                    .as_deref()
                    .map(serde_json::from_str::<Value>)
                    .transpose()
                    .context("--params is not valid JSON")?;
                let limit = if no_limit {
                    Some(Value::Null)
                } else {
                    limit.map(Value::from)
                };
                (
                    "prepare_query",
                    object([
                        ("query", text(query)),
                        ("use_case", text(use_case)),
                        ("parameters", parameters),
                        ("limit", limit),
                        ("version", text(version)),
                    ]),
                )
            }
            Commands::Columns {
                version,
                feature_level,
                column_type,
                search,
            } => (
                "get_focus_columns",
                object([
                    ("version", text(version)),
                    ("feature_level", text(feature_level)),
                    ("column_type", text(column_type)),
                    ("search", text(search)),
                ]),
            ),
            Commands::Attributes { version, search } => (
                "get_focus_attributes",
                object([("version", text(version)), ("search", text(search))]),
            ),
            Commands::Column { id, version } => (
                "find_focus_column",
                object([("column_id", text(Some(id))), ("version", text(version))]),
            ),
            Commands::Attribute { id, version } => (
                "find_focus_attribute",
                object([("attribute_id", text(Some(id))), ("version", text(version))]),
            ),
            Commands::Versions => ("get_focus_versions", Value::Object(Map::new())),
            Commands::Info => ("get_server_info", Value::Object(Map::new())),
            Commands::Tools => anyhow::bail!("tools is not a tool call"),
            Commands::Call { tool, args } => {
                let args: Value = serde_json::from_str(&args).context("--args is not valid JSON")?;
                return Ok((tool, args));
            }
        };

        Ok((call.0.to_string(), call.1))
    }
}

fn text(value: Option<String>) -> Option<Value> {
    value.map(Value::String)
}

/// JSON object holding only the fields that were given
fn object<const N: usize>(fields: [(&str, Option<Value>); N]) -> Value {
    let map: Map<String, Value> = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect();
    Value::Object(map)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{}", rendered);
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Commands::Tools = cli.command {
        print_json(&all_tool_specs())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = CatalogConfig::from_env();
    if let Some(dir) = cli.resources_dir {
        config.resources_dir = dir;
    }
    if let Some(version) = cli.focus_version.as_deref() {
        config = config.with_version(version);
    }

    let catalog = FocusCatalog::load(&config).context("failed to load catalog")?;
    let (tool, args) = cli.command.into_call()?;

    let ctx = ToolContext {
        catalog: &catalog,
        config: &config,
    };
    let response = dispatch_tool(&ctx, &tool, &args);
    print_json(&response.to_json())?;

    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
