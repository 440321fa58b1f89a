//! # Poolwatch CLI
//!
//! Command-line interface for the poolwatch subscription manager.
//!
//! This CLI provides commands for:
//! - Validating the static watch configuration
//! - Replaying a navigation script against the in-memory transport

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use poolwatch_telemetry::logging::{LogFormat, init_logging};

use commands::{AppConfig, check, replay};

/// Poolwatch - live pool account subscription manager
#[derive(Parser)]
#[command(name = "poolwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the configured log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Configuration file path (.yaml, .toml or .json)
    #[arg(short, long, global = true, default_value = "poolwatch.yaml")]
    config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration, then print a summary
    Check(check::CheckArgs),

    /// Drive the subscription controller through a navigation script
    Replay(replay::ReplayArgs),
}

/// Log format accepted on the command line
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    /// JSON lines
    Json,
    /// Human-readable
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format.into());
    }
    let _guards = init_logging(&logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Check(args) => check::run(&config, &args),
        Commands::Replay(args) => replay::run(&config, &args).await?,
    }

    Ok(())
}
