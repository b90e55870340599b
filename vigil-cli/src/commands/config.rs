//! Config command - show the effective configuration.

use anyhow::Result;
use vigil_store::Config;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Prints the configuration after defaults and overrides.
pub fn run(cli: &Cli, config: &Config) -> Result<ExitCode> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_config(config, &cli.config));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(config)?);
        }
    }

    Ok(ExitCode::Success)
}
