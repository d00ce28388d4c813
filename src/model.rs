//! Generated model file naming and state-count validation.

use crate::error::HarnessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// State count used when the caller does not supply one.
pub const DEFAULT_NUM_STATES: u32 = 10;

const FILE_PREFIX: &str = "prismFileTmp_";
const FILE_SUFFIX: &str = "_states.sm";

/// A validated, strictly positive number of model states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct NumStates(u32);

impl NumStates {
    /// Validate a caller-supplied count. Zero, negative and out-of-range values are rejected.
    pub fn new(value: i64) -> Result<Self, HarnessError> {
        if value < 1 {
            return Err(HarnessError::InvalidInput(format!(
                "number of states must be a positive integer, got {}",
                value
            )));
        }
        u32::try_from(value).map(NumStates).map_err(|_| {
            HarnessError::InvalidInput(format!(
                "number of states {} exceeds the supported maximum of {}",
                value,
                u32::MAX
            ))
        })
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for NumStates {
    fn default() -> Self {
        NumStates(DEFAULT_NUM_STATES)
    }
}

impl fmt::Display for NumStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for NumStates {
    type Error = HarnessError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        NumStates::new(value)
    }
}

impl From<NumStates> for u32 {
    fn from(value: NumStates) -> Self {
        value.0
    }
}

/// File name the generator's output is written to: `prismFileTmp_{n}_states.sm`.
pub fn model_file_name(num_states: NumStates) -> String {
    format!("{}{}{}", FILE_PREFIX, num_states, FILE_SUFFIX)
}

/// Parse a state count back out of a generated file name, if it is one.
///
/// Only names [`model_file_name`] would produce are accepted, so
/// `prismFileTmp_007_states.sm` is not a generated file.
pub fn parse_model_file_name(name: &str) -> Option<NumStates> {
    let digits = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num_states = digits.parse::<i64>().ok().and_then(|n| NumStates::new(n).ok())?;
    (model_file_name(num_states) == name).then_some(num_states)
}

/// A model file produced by one generator run. The caller owns it from here on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedModelFile {
    pub num_states: NumStates,
    pub path: PathBuf,
}

impl GeneratedModelFile {
    /// Derive the output path for `num_states` under `output_dir`.
    ///
    /// With no output directory the path is the bare file name, relative to
    /// the current working directory.
    pub fn new(num_states: NumStates, output_dir: Option<&Path>) -> Self {
        let file_name = model_file_name(num_states);
        let path = match output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        };
        Self { num_states, path }
    }

    pub fn file_name(&self) -> String {
        model_file_name(self.num_states)
    }
}
