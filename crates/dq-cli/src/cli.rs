//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dq",
    version,
    about = "Data quality pipeline - validate, clean, and load tabular sources",
    long_about = "Fetch configured tabular sources (CSV files, JSON APIs), enforce \n\
                  their declared schemas and business rules, repair recoverable \n\
                  defects, and replace the persistence targets wholesale."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline over every configured source.
    Run(RunArgs),

    /// List the sources a configuration declares.
    Sources(SourcesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the TOML source configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// SQLite database to write targets to (overrides the config default).
    #[arg(long = "database", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Validate and clean without writing any target.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct SourcesArgs {
    /// Path to the TOML source configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
