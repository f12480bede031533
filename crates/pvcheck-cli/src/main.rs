//! Parameter value validator CLI.

use clap::{ColorChoice, Parser};
use pvcheck_cli::commands::run_validation;
use pvcheck_cli::logging::{LogConfig, LogFormat, init_logging};
use pvcheck_cli::types::RunOptions;
use pvcheck_validate::ExitStatus;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, LogFormatArg, LogLevelArg};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(i32::from(ExitStatus::Error.code()));
    }
    let options = RunOptions {
        settings: cli.settings,
        urls: cli.urls,
        report_json: cli.report_json,
        fail_on_unchecked: cli.fail_on_unchecked,
    };
    let status = match run_validation(&options) {
        Ok(result) => {
            print_summary(&result);
            result.exit_status
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitStatus::Error
        }
    };
    std::process::exit(i32::from(status.code()));
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_timestamps = cli.log_timestamps;
    config.with_target = cli.log_target;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_flags_reach_the_config() {
        let cli = Cli::try_parse_from([
            "pvcheck",
            "settings.json",
            "db.json",
            "--log-timestamps",
            "--log-target",
            "--log-level",
            "debug",
            "--color",
            "never",
        ])
        .unwrap();
        let config = log_config_from_cli(&cli);
        assert!(config.with_timestamps);
        assert!(config.with_target);
        assert!(!config.with_ansi);
        assert!(!config.use_env_filter);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn log_details_are_off_by_default() {
        let cli = Cli::try_parse_from(["pvcheck", "settings.json", "db.json"]).unwrap();
        let config = log_config_from_cli(&cli);
        assert!(!config.with_timestamps);
        assert!(!config.with_target);
        assert!(config.use_env_filter);
    }
}
