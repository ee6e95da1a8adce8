// batch-exports - Batch export scheduling and run tracking
// Copyright (c) 2025 batch-exports Contributors
// Licensed under the MIT License

use batch_exports::cli::commands::EXIT_FATAL;
use batch_exports::cli::Cli;
use batch_exports::config::{load_config, LoggingConfig};
use batch_exports::logging::init_logging;
use clap::Parser;
use std::process;

fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging only when the configuration loads and enables it. Errors in
    // the configuration itself are reported by the command.
    let (config_level, logging_config) = match load_config(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => ("info".to_string(), LoggingConfig::default()),
    };
    let log_level = cli.log_level.clone().unwrap_or(config_level);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "batch-exports");

    let exit_code = match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    process::exit(exit_code);
}
