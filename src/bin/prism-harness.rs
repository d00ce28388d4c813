//! Prism Harness CLI Binary
//!
//! Command-line interface for building the PRISM model generator and producing model files.

use clap::Parser;
use prism_harness::cli::{build_logging_config, load_config, map_error, Cli, RunContext};
use prism_harness::logging::init_logging;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Logging settings live in the config, so it has to load first.
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &config.logging);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Prism harness starting");

    let context = match RunContext::new(cli.workspace.clone(), config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing harness: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}
