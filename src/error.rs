//! Error types for the PRISM model harness.

use std::time::Duration;
use thiserror::Error;

/// Failures of a single external process run.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?} and was killed")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} was cancelled and killed")]
    Cancelled { program: String },

    #[error("Process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Harness-level errors surfaced to callers and the CLI.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Harness has not been built. Run `prism-harness setup` first.")]
    NotBuilt,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for HarnessError {
    fn from(err: config::ConfigError) -> Self {
        HarnessError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        HarnessError::ConfigError(format!("JSON error: {}", err))
    }
}
