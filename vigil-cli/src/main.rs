// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Vigil - a lightweight service-health monitor.
//!
//! # Examples
//!
//! ```bash
//! # Run the monitor and query server (default command)
//! vigil --config config.yaml
//!
//! # Override the query port
//! vigil serve --port 9090
//!
//! # Probe every check once and exit non-zero if any is not up
//! vigil check
//!
//! # One check, JSON output
//! vigil check --name api --format json --pretty
//!
//! # Show the effective configuration
//! vigil config
//! ```

mod commands;
mod output;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};
use vigil_store::{Config, DEFAULT_CONFIG_PATH, DEFAULT_LOG_LEVEL};

use commands::{check, config, serve};

// ============================================================================
// CLI Definition
// ============================================================================

/// Vigil - service-health monitoring.
#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Lightweight service-health monitor")]
#[command(long_about = r"
Vigil periodically probes configured targets and serves the latest result
for each one over HTTP.

Supported check types:
  • http        GET a URL and compare the status code
  • tcp         Open a TCP connection to host:port
  • kubernetes  Query the cluster control plane's /healthz

Query endpoints:
  GET /health         Liveness of the monitor itself
  GET /results        Latest result for every check
  GET /result/{name}  Latest result for one check

Examples:
  vigil                          # Run monitor + query server
  vigil check                    # Probe everything once
  vigil check --name api         # Probe one check
  vigil config --format json     # Effective configuration
")]
#[command(version)]
#[command(author = "Vigil Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'serve'.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file.
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Query server port (overrides apiPort).
    #[arg(long, short = 'p', global = true)]
    pub port: Option<u16>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (debug logging).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log line format. `RUST_LOG_FORMAT=json` also selects JSON.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the monitor and query server (default if no command specified).
    #[command(visible_alias = "s")]
    Serve,

    /// Probe the configured checks once and print the results.
    #[command(visible_alias = "c")]
    Check(check::CheckArgs),

    /// Show the effective configuration.
    Config,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success, or every check is up.
    Success = 0,
    /// Startup error, or at least one check is not up.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Filter precedence: `RUST_LOG`, then `--verbose`, then the config's `logLevel`.
fn setup_logging(cli: &Cli, config_level: &str) {
    if cli.quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("vigil=debug,info")
        } else {
            EnvFilter::try_new(config_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
        }
    });

    let json = cli.log_format == LogFormat::Json
        || std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let layer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging is configured from the file, so load it first and report
    // failures once a subscriber exists.
    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map_or(DEFAULT_LOG_LEVEL, |c| c.log_level.as_str());
    setup_logging(&cli, level);

    let result = match loaded {
        Ok(mut config) => {
            if let Some(port) = cli.port {
                config.api_port = port;
            }
            run(&cli, config).await
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!(
            "failed to load configuration from {}",
            cli.config.display()
        ))),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::Error
        }
    };

    std::process::exit(code as i32);
}

async fn run(cli: &Cli, config: Config) -> Result<ExitCode> {
    match &cli.command {
        Some(Commands::Serve) | None => serve::run(cli, config).await,
        Some(Commands::Check(args)) => check::run(args, cli, &config).await,
        Some(Commands::Config) => config::run(cli, &config),
    }
}
