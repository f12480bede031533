//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pvcheck",
    version,
    about = "Validate parameter values against pattern-matched rules",
    long_about = "Validate the parameter values of one or more databases.\n\n\
                  Rules are read from a JSON settings file and select values by \
                  class, parameter, entity and alternative name patterns."
)]
pub struct Cli {
    /// Settings file with the validation rules.
    #[arg(value_name = "SETTINGS")]
    pub settings: PathBuf,

    /// Database URLs (file://, json:// or a plain path to an exported database).
    #[arg(value_name = "URL", required = true, num_args = 1..)]
    pub urls: Vec<String>,

    /// Write a JSON report of all databases to this file.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Treat values no rule applies to as failures.
    #[arg(long = "fail-on-unchecked")]
    pub fail_on_unchecked: bool,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "compact")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Include timestamps in log lines.
    #[arg(long = "log-timestamps")]
    pub log_timestamps: bool,

    /// Include the emitting module in log lines.
    #[arg(long = "log-target")]
    pub log_target: bool,
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
