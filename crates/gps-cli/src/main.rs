//! `gps-canon`: canonicalize vendor GPS reports from the command line.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use gps_cli::cli::{Cli, Command};
use gps_cli::commands::{run_canonicalize, run_convert, run_metrics, run_reset, run_suggest};
use gps_cli::logging::{LogConfig, init_logging, redact_value};
use gps_cli::summary::{print_canonical_summary, print_suggest_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Canonicalize(args) => run_canonicalize(args).map(|result| {
            print_canonical_summary(&result);
        }),
        Command::Suggest(args) => run_suggest(args).map(|result| {
            print_suggest_summary(&result);
        }),
        Command::Metrics(args) => run_metrics(args),
        Command::Convert(args) => run_convert(args).map(|converted| {
            println!("{converted}");
        }),
        Command::ResetMappings(args) => run_reset(args).map(|removed| {
            for mapping in &removed {
                println!(
                    "removed {} -> {} ({})",
                    redact_value(&mapping.raw_name),
                    mapping.player_id,
                    mapping.gps_system
                );
            }
            println!("{} mapping(s) removed", removed.len());
        }),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Logging settings from the global flags. `--log-level` beats `-v`/`-q`;
/// `RUST_LOG` only applies when neither was given.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let explicit = cli.verbosity.is_present() || cli.log_level.is_some();
    LogConfig {
        level_filter: cli
            .log_level
            .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from),
        use_env_filter: !explicit,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        log_data: cli.log_data,
        with_ansi: match cli.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
        },
        ..LogConfig::default()
    }
}
