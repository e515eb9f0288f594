mod config;
mod directives;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use floe_agent::AnalystClient;
use floe_telemetry::{init_telemetry, TelemetryConfig};

use crate::config::FloeConfig;
use crate::directives::strip_directives;

/// Ask a data question in natural language and print the streamed answer.
#[derive(Debug, Parser)]
#[command(name = "floe", version, about)]
struct Cli {
    /// The question to ask. `/sql` anywhere in the text also prints the
    /// generated SQL; `/chart` asks for a chart recommendation.
    #[arg(required = true)]
    question: Vec<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,

    /// Enable debug-level logging.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        log_level: if cli.verbose { Level::DEBUG } else { Level::INFO },
        json: cli.log_json,
        ..TelemetryConfig::default()
    });

    let config = FloeConfig::from_env().context("invalid configuration")?;

    let (question, flags) = strip_directives(&cli.question.join(" "));
    anyhow::ensure!(!question.is_empty(), "question is empty after removing flags");

    let client = AnalystClient::new(config.analyst_config(), config.token_source.supplier())
        .with_policy(config.response_policy());

    let result = client
        .ask(&question)
        .await
        .context("analyst request failed")?;

    println!("{}", result.text);

    if flags.show_sql && result.has_sql() {
        println!("\n```sql\n{}\n```", result.sql);
    }

    if !result.suggestions.is_empty() {
        println!("\nYou could also ask:");
        for suggestion in &result.suggestions {
            println!("  - {suggestion}");
        }
    }

    if flags.want_chart {
        // Chart selection runs on query results, which need a warehouse
        // connection this binary does not open.
        tracing::info!("chart requested; connect a warehouse to render query results");
    }

    for error in &result.diagnostics.errors {
        tracing::warn!(code = %error.code, message = %error.message, "analyst reported an error event");
    }

    Ok(())
}
