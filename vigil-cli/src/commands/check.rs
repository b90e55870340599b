//! Check command - probe once and report.

use anyhow::{Result, bail};
use clap::Args;
use tracing::debug;
use vigil_core::CheckSpec;
use vigil_probe::Prober;
use vigil_runner::Runner;
use vigil_store::Config;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the check command.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Only run the check with this name.
    #[arg(long, short)]
    pub name: Option<String>,
}

/// Runs the selected checks once. Fails the process if any is not up.
pub async fn run(args: &CheckArgs, cli: &Cli, config: &Config) -> Result<ExitCode> {
    let specs: Vec<CheckSpec> = match &args.name {
        Some(name) => match config.check(name) {
            Some(spec) => vec![spec.clone()],
            None => bail!("unknown check: {name}"),
        },
        None => config.checks.clone(),
    };

    debug!(checks = specs.len(), "Running checks once");
    let prober = Prober::new()?;
    let results = Runner::execute_all(&specs, &prober).await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_results(&results));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&results)?);
        }
    }

    if results.iter().all(vigil_core::CheckResult::is_up) {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::Error)
    }
}
