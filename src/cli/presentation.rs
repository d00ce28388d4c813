//! CLI presentation: text and JSON formatting of harness results.

mod build;
mod status;

pub use build::{format_build_report, format_clean_result, format_generated};
pub use status::{format_config, format_status};

use crate::error::HarnessError;
use serde::Serialize;

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, HarnessError> {
    serde_json::to_string_pretty(value).map_err(HarnessError::from)
}
