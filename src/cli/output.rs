//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::HarnessError;

/// Map harness errors to a string for CLI output.
pub fn map_error(e: &HarnessError) -> String {
    match e {
        HarnessError::InvalidInput(_) => format!("{}\nNUM_STATES must be a positive integer.", e),
        _ => e.to_string(),
    }
}
