//! Configuration System
//!
//! Layered harness configuration: built-in defaults, the user-level config
//! file, workspace config files, then `PRISM_HARNESS__*` environment
//! overrides. Covers the external toolchain, the source units to compile,
//! process timeouts, output placement and logging.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::{default_log_file_path, global_config_path, project_dirs};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// External compiler and runtime commands
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    /// Source units compiled by `setup`
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Process supervision settings
    #[serde(default)]
    pub process: ProcessConfig,

    /// Where generated model files are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Harness bookkeeping (build stamp)
    #[serde(default)]
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_compiler")]
    pub compiler: String,

    #[serde(default = "default_runtime")]
    pub runtime: String,
}

fn default_compiler() -> String {
    "javac".to_string()
}

fn default_runtime() -> String {
    "java".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            runtime: default_runtime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// PRISM model generator source file
    #[serde(default = "default_generator_source")]
    pub generator: PathBuf,

    /// Importance-sampling scaffold source file (compiled, never run)
    #[serde(default = "default_scaffold_source")]
    pub scaffold: PathBuf,
}

fn default_generator_source() -> PathBuf {
    PathBuf::from("src/PrismModelGenerator.java")
}

fn default_scaffold_source() -> PathBuf {
    PathBuf::from("src/scaffoldImportanceSampling.java")
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            generator: default_generator_source(),
            scaffold: default_scaffold_source(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Upper bound on each compiler run
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,

    /// Upper bound on each generator run
    #[serde(default = "default_generate_timeout_secs")]
    pub generate_timeout_secs: u64,
}

fn default_build_timeout_secs() -> u64 {
    120
}

fn default_generate_timeout_secs() -> u64 {
    60
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            build_timeout_secs: default_build_timeout_secs(),
            generate_timeout_secs: default_generate_timeout_secs(),
        }
    }
}

impl ProcessConfig {
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory; unset means the current working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".prism-harness")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Toolchain(String),
    Sources(String),
    Process(String),
    State(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Toolchain(msg) => write!(f, "Toolchain: {}", msg),
            ValidationError::Sources(msg) => write!(f, "Sources: {}", msg),
            ValidationError::Process(msg) => write!(f, "Process: {}", msg),
            ValidationError::State(msg) => write!(f, "State: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl HarnessConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.toolchain.compiler.trim().is_empty() {
            errors.push(ValidationError::Toolchain(
                "compiler command cannot be empty".to_string(),
            ));
        }
        if self.toolchain.runtime.trim().is_empty() {
            errors.push(ValidationError::Toolchain(
                "runtime command cannot be empty".to_string(),
            ));
        }

        for (name, path) in [
            ("generator", &self.sources.generator),
            ("scaffold", &self.sources.scaffold),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError::Sources(format!(
                    "{} source path cannot be empty",
                    name
                )));
            } else if path.file_stem().is_none() {
                errors.push(ValidationError::Sources(format!(
                    "{} source path {} has no file name",
                    name,
                    path.display()
                )));
            }
        }

        if self.process.build_timeout_secs == 0 {
            errors.push(ValidationError::Process(
                "build_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.process.generate_timeout_secs == 0 {
            errors.push(ValidationError::Process(
                "generate_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.state.dir.as_os_str().is_empty() {
            errors.push(ValidationError::State(
                "state dir cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Resolve every configured path against the workspace root.
    pub fn resolve_paths(&self, workspace_root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            generator_source: resolve_against(workspace_root, &self.sources.generator),
            scaffold_source: resolve_against(workspace_root, &self.sources.scaffold),
            output_dir: self
                .output
                .dir
                .as_ref()
                .map(|dir| resolve_against(workspace_root, dir)),
            state_dir: resolve_against(workspace_root, &self.state.dir),
        }
    }
}

/// Configured paths after resolution against a workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub generator_source: PathBuf,
    pub scaffold_source: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub state_dir: PathBuf,
}

/// Join `path` onto `root` unless it is absolute. A `.` root leaves the path untouched.
fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || root.as_os_str().is_empty() || root == Path::new(".") {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
