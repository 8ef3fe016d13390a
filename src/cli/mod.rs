//! Command-line entry point: argument parsing, configuration merging and
//! command dispatch.

mod config_merger;
mod executor;
mod handlers;
mod parser;
mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, LogLevel};

use anyhow::Context;
use clap::Parser;

use crate::logger::init_logger;

/// Parses the process arguments, loads the configuration, starts logging and
/// runs the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = ConfigurationMerger::load(&cli)
        .and_then(|merger| merger.merge_cli_args(&cli))
        .context("Failed to load configuration")?;

    let logger_config = settings
        .logger
        .to_logger_config()
        .context("Invalid logger configuration")?;
    init_logger(&logger_config)?;

    execute_command(&cli, settings).await
}
