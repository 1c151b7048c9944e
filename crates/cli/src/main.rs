//! chatread CLI
//!
//! Main entry point for the chatread command-line tool.
//! Answers questions from a search index with a retrieve-then-generate flow.

mod commands;

use anyhow::Context;
use chatread_core::{config::AppConfig, logging, AppResult};
use clap::{Parser, Subcommand};
use commands::{ApproachesCommand, AskCommand};
use std::path::PathBuf;
use tracing::Instrument;

/// chatread - conversational answers grounded in a search index
#[derive(Parser, Debug)]
#[command(name = "chatread")]
#[command(about = "Conversational question answering over a search index", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "CHATREAD_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CHATREAD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Completion provider (azure-openai, openai, ollama)
    #[arg(short, long, global = true, env = "CHATREAD_PROVIDER")]
    provider: Option<String>,

    /// Template set to answer with
    #[arg(short, long, global = true, env = "CHATREAD_APPROACH")]
    approach: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question, optionally continuing a conversation
    Ask(AskCommand),

    /// List available template sets
    Approaches(ApproachesCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Workspace and config path decide which config file is merged
    let config = AppConfig::load_from(cli.workspace, cli.config)
        .context("Failed to load configuration")?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.approach,
        cli.log_level,
        cli.verbose,
        cli.no_color,
        cli.log_json,
    );

    let log_format = if config.log_json {
        logging::LogFormat::Json
    } else {
        logging::LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)
        .context("Failed to initialize logging")?;

    tracing::info!("chatread starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.llm.provider);
    tracing::debug!("Approach: {}", config.approach);

    let command_name = cli.command.name();
    let result = dispatch(cli.command, &config).await;

    result.with_context(|| format!("chatread {} failed", command_name))
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Approaches(_) => "approaches",
        }
    }
}

/// Route to the command handler inside a `command` span.
async fn dispatch(command: Commands, config: &AppConfig) -> AppResult<()> {
    let span = tracing::info_span!("command", name = command.name());

    let result = match command {
        Commands::Ask(cmd) => cmd.execute(config).instrument(span.clone()).await,
        Commands::Approaches(cmd) => span.in_scope(|| cmd.execute(config)),
    };

    span.in_scope(|| match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    });

    result
}
