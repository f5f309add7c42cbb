//! `sheetkin` command line tool.
//!
//! Reads configuration from `SHEETKIN_*` environment variables, applies
//! command-line overrides, initialises stderr logging and dispatches to a
//! subcommand. Configuration errors exit with status 2, runtime failures
//! with status 1.

mod cli;
mod commands;
mod config;
mod logging;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::cli::{Cli, Commands};
use crate::config::{AppConfig, ConfigError};

fn build_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let inject = match &cli.command {
        Commands::Expand(args) if args.inject_background => Some(true),
        _ => None,
    };
    Ok(AppConfig::from_env()?.apply_overrides(cli.log_level, inject))
}

fn run(cli: &Cli, config: &AppConfig) -> eyre::Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match &cli.command {
        Commands::Sheet(args) => commands::run_sheet(args, &mut writer)?,
        Commands::Expand(args) => {
            commands::run_expand(args, config, &mut io::stdin().lock(), &mut writer)?;
        }
        Commands::Table(args) => commands::run_table(args, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            logging::init_logging(&AppConfig::default());
            error!(error = %err, "configuration error");
            return ExitCode::from(2);
        }
    };
    logging::init_logging(&config);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
