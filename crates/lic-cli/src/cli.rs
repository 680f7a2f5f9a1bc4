//! CLI argument definitions for `lic`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "lic",
    version,
    about = "Inspect, check and upgrade Lic instruction books",
    long_about = "Inspect, check and upgrade Lic instruction books (.lic).\n\n\
                  Reads every format version from 1 to the current one and\n\
                  writes any of them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

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

    /// Read settings from this file instead of the platform config folder.
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a document and summarise its contents.
    Inspect(InspectArgs),

    /// Load a document and report problems found while linking it.
    Check(CheckArgs),

    /// Rewrite a document at another format version.
    Upgrade(UpgradeArgs),

    /// Show the version-gate table.
    Gates(GatesArgs),
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Instruction book to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the summary as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Instruction book to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Fail on the first problem instead of collecting them.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Parser)]
pub struct UpgradeArgs {
    /// Instruction book to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Where to write the result (default: replace FILE).
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Format version to write (default: from settings, else current).
    #[arg(
        long = "target-version",
        value_name = "N",
        value_parser = clap::value_parser!(i16).range(1..=23)
    )]
    pub target_version: Option<i16>,

    /// Keep the replaced file as <stem>_bak.lic.
    #[arg(long = "backup")]
    pub backup: bool,
}

#[derive(Parser)]
pub struct GatesArgs {
    /// Mark the fields stored at this format version.
    #[arg(
        long = "format-version",
        value_name = "N",
        value_parser = clap::value_parser!(i16).range(1..=23)
    )]
    pub version: Option<i16>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
