//! Dispatch Agent CLI
//!
//! `query` runs one request and prints the envelope, `serve` exposes the same
//! entry point over HTTP, `tasks` lists what can be routed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use dispatch_agent::agent::Parameters;
use dispatch_agent::server::{run_server, AppState};
use dispatch_agent::utils::{init_tracing, telemetry::DEFAULT_FILTER, StartupChecks};
use dispatch_agent::{AgentConfig, Supervisor};

#[derive(Parser)]
#[command(name = "dispatch_agent", version, about = "Routes requests to tool endpoints")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single query and print the response envelope
    Query {
        /// Free-text input or situation context
        #[arg(short, long, default_value = "")]
        input: String,
        /// Explicit task, e.g. calendar.get_events
        #[arg(short, long)]
        task: Option<String>,
        /// Task parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },
    /// Serve POST /query over HTTP
    Serve {
        /// Listen address; defaults to AGENT_BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// List routable task namespaces
    Tasks,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    init_tracing(DEFAULT_FILTER)?;

    let cli = Cli::parse();

    let config = AgentConfig::from_env().context("Failed to load configuration")?;
    StartupChecks::verify(&config).context("Configuration check failed")?;
    let supervisor = Arc::new(Supervisor::from_config(&config)?);

    match cli.command {
        Command::Query { input, task, params } => {
            let parameters = params.as_deref().map(parse_parameters).transpose()?;
            let response = supervisor.query(&input, task.as_deref(), parameters).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            let state = AppState {
                supervisor,
                project_id: config.project_id.clone(),
                location: config.location.clone(),
            };
            run_server(state, &addr).await?;
        }
        Command::Tasks => {
            for tool in supervisor.tools().describe() {
                println!("{:<14} {}", tool.namespace, tool.description);
                for task in tool.tasks {
                    println!("    {}", task);
                }
            }
        }
    }

    Ok(())
}

fn parse_parameters(raw: &str) -> Result<Parameters> {
    serde_json::from_str::<Parameters>(raw).context("--params must be a JSON object")
}
