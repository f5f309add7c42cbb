//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::LogLevel;

/// Turn Gherkin feature files into test-case sheets, expand Scenario
/// Outlines, and convert CSV tables into Examples blocks.
#[derive(Parser, Debug)]
#[command(name = "sheetkin", version, about)]
pub(crate) struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Write one CSV test-case sheet per feature file.
    Sheet(SheetArgs),
    /// Expand Scenario Outlines into concrete Scenarios.
    Expand(ExpandArgs),
    /// Convert a CSV file into aligned Examples tables.
    Table(TableArgs),
}

/// Column layout of a test-case sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum SheetMode {
    /// Given/When/Then columns with test data and tag columns.
    #[default]
    Standard,
    /// Method, endpoint, headers, body and expected status columns.
    Api,
}

#[derive(Args, Debug)]
pub(crate) struct SheetArgs {
    /// A feature file or a directory searched recursively.
    pub input: PathBuf,
    /// Directory receiving `<sheet>.csv` files.
    #[arg(long, default_value = "output")]
    pub out_dir: PathBuf,
    /// Column layout of the written sheets.
    #[arg(long, value_enum, default_value_t = SheetMode::Standard)]
    pub mode: SheetMode,
    /// Print the parsed scenarios as JSON instead of writing CSV files.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExpandArgs {
    /// Feature files to expand. Repeat the flag or separate with commas.
    /// Standard input is read when none is given.
    #[arg(short, long = "input", value_delimiter = ',')]
    pub inputs: Vec<PathBuf>,
    /// Output file, or a directory receiving `<name>-expand.feature`.
    /// Paths that exist as directories or lack a `.feature` extension are
    /// directories. Stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Inline Background steps into every Scenario.
    #[arg(long)]
    pub inject_background: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TableArgs {
    /// CSV files to convert.
    pub inputs: Vec<PathBuf>,
    /// Also convert every `.csv` file in this directory.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Search `--dir` recursively.
    #[arg(short, long, requires = "dir")]
    pub recursive: bool,
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Spaces before each table row.
    #[arg(long, default_value_t = 4)]
    pub indent: usize,
    /// Keep only these columns: header names or `#index`, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Replace values of these columns with `****`, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub mask: Vec<String>,
    /// Treat the first row of each table as data.
    #[arg(long)]
    pub no_header: bool,
    /// Blank rows needed to start a new table.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub table_gap: u16,
}
