#![allow(clippy::enum_variant_names)]

use std::process::ExitCode;

use clap::Parser as _;
use tracing::debug;

use crate::{
    application::Application,
    checking::StrategyRegistry,
    cli::{Cli, expand_legacy_options},
};

mod application;
mod checking;
mod cli;
mod ext;
mod filesystem;

/// Exit status for startup failures, the unsigned image of -1.
const STARTUP_FAILURE_EXIT_CODE: u8 = 255;

#[compio::main]
async fn main() -> ExitCode {
    let registry = StrategyRegistry::with_builtin_strategies();

    let cli_args = match Cli::try_parse_from(expand_legacy_options(std::env::args_os())) {
        Ok(cli_args) => cli_args,
        Err(err) if err.use_stderr() => {
            err.print().ok();
            return ExitCode::from(STARTUP_FAILURE_EXIT_CODE);
        }
        Err(err) => err.exit(),
    };
    setup_tracing(&cli_args);
    debug!("Parsed CLI arguments: {cli_args:?}");

    match Application::run(cli_args, &registry).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", snafu::Report::from_error(err));
            ExitCode::from(STARTUP_FAILURE_EXIT_CODE)
        }
    }
}

fn setup_tracing(cli_args: &Cli) {
    if cli_args.log_level.to_level_filter() != tracing::level_filters::LevelFilter::OFF {
        tracing_subscriber::fmt()
            .with_max_level(cli_args.log_level.to_level_filter())
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}
