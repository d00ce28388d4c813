//! CLI domain: parse, route, help, output, and presentation only.
//! No harness logic; single route table dispatches to the harness.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_build_report, format_clean_result, format_config, format_generated, format_status,
};
pub use route::RunContext;

use crate::config::{ConfigLoader, HarnessConfig};
use crate::error::HarnessError;
use crate::logging::LoggingConfig;

/// Load configuration the way the CLI flags ask for: an explicit `--config`
/// file, or layered loading for `--workspace`.
pub fn load_config(cli: &Cli) -> Result<HarnessConfig, HarnessError> {
    match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path),
        None => ConfigLoader::load(&cli.workspace),
    }
}

/// Build logging configuration from the loaded config and CLI flags.
/// Precedence: CLI flags override config file override defaults.
pub fn build_logging_config(cli: &Cli, base: &LoggingConfig) -> LoggingConfig {
    let mut config = base.clone();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
