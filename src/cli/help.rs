//! CLI command-name contract for logging spans.

use crate::cli::parse::Commands;

/// Command name string for log spans (e.g. "setup", "generate").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Setup { .. } => "setup",
        Commands::Generate { .. } => "generate",
        Commands::Clean { .. } => "clean",
        Commands::Status { .. } => "status",
        Commands::Config => "config",
    }
}
