//! CLI parse: clap types for the harness. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prism harness - build the PRISM model generator and produce model files
#[derive(Parser)]
#[command(name = "prism-harness")]
#[command(about = "Build the PRISM model generator and produce model files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (sources and config resolve against it)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely; errors are still printed
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the generator and the importance-sampling scaffold
    Setup {
        /// Recompile even when sources are unchanged
        #[arg(long)]
        force: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Build if needed, then generate one model file per state count
    Generate {
        /// Number of states for each model (default: 10)
        #[arg(allow_negative_numbers = true)]
        num_states: Vec<i64>,
        /// Recompile before generating even when sources are unchanged
        #[arg(long)]
        force_build: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Remove generated model files from the output directory
    Clean {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Show source, artifact and build-stamp state of each unit
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
