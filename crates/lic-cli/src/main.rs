//! `lic`: inspect, check and upgrade instruction books.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use lic_cli::logging::{LogConfig, LogFormat, init_logging};
use lic_cli::settings::{Settings, load_settings, load_settings_from};
use lic_persistence::PersistenceError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_check, run_gates, run_inspect, run_upgrade};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let settings = settings_from_cli(&cli);

    let result = match &cli.command {
        Command::Inspect(args) => run_inspect(args, &settings),
        Command::Check(args) => run_check(args, &settings),
        Command::Upgrade(args) => run_upgrade(args, &settings),
        Command::Gates(args) => run_gates(args),
    };
    let exit_code = match result {
        Ok(code) => code,
        Err(error) => {
            report_error(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<PersistenceError>() {
        Some(persistence) => {
            eprintln!("error: {}", persistence.user_message());
            if let Some(hint) = persistence.suggestion() {
                eprintln!("hint: {hint}");
            }
        }
        None => eprintln!("error: {error:#}"),
    }
}

fn settings_from_cli(cli: &Cli) -> Settings {
    match &cli.settings {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    }
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
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
