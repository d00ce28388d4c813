//! The harness: build the external programs once, then generate model files.
//!
//! ```no_run
//! use prism_harness::config::HarnessConfig;
//! use prism_harness::harness::Harness;
//! use std::path::Path;
//!
//! let harness = Harness::new(HarnessConfig::default(), Path::new("."))?;
//! harness.setup()?;
//! let model = harness.create_prism_file(3)?;
//! assert_eq!(model.path.to_str(), Some("prismFileTmp_3_states.sm"));
//! # Ok::<(), prism_harness::error::HarnessError>(())
//! ```

use crate::build::{with_diagnostics, BuildReport, BuildStamp, BuildStep, SourceUnit};
use crate::config::{HarnessConfig, ResolvedPaths};
use crate::error::HarnessError;
use crate::model::{parse_model_file_name, GeneratedModelFile, NumStates, DEFAULT_NUM_STATES};
use crate::process::{CancelHandle, CommandSpec, ProcessRunner, StdoutTarget, TokioProcessRunner};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const GENERATOR_UNIT: &str = "generator";
pub const SCAFFOLD_UNIT: &str = "scaffold";

/// What the harness knows about its own build step.
#[derive(Debug, Clone)]
pub enum BuildState {
    NotBuilt,
    Built(BuildReport),
    Failed(String),
}

impl BuildState {
    pub fn label(&self) -> String {
        match self {
            BuildState::NotBuilt => "not built".to_string(),
            BuildState::Built(_) => "built".to_string(),
            BuildState::Failed(reason) => format!("failed: {}", reason),
        }
    }
}

/// Per-unit view for `status`.
#[derive(Debug, Clone, Serialize)]
pub struct UnitStatus {
    pub name: String,
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub source_exists: bool,
    pub artifact_exists: bool,
    pub up_to_date: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessStatus {
    pub units: Vec<UnitStatus>,
    pub build_state: String,
    pub output_dir: PathBuf,
}

pub struct Harness {
    config: HarnessConfig,
    paths: ResolvedPaths,
    runner: Arc<dyn ProcessRunner>,
    cancel: Option<CancelHandle>,
    state: Mutex<BuildState>,
}

impl Harness {
    /// Harness backed by the default tokio process runner.
    pub fn new(config: HarnessConfig, workspace_root: &Path) -> Result<Self, HarnessError> {
        let runner = TokioProcessRunner::new().map_err(|e| {
            HarnessError::ConfigError(format!("Failed to start process runtime: {}", e))
        })?;
        let cancel = runner.cancel_handle();
        let mut harness = Self::with_runner(config, workspace_root, Arc::new(runner));
        harness.cancel = Some(cancel);
        Ok(harness)
    }

    /// Harness with a caller-supplied runner.
    pub fn with_runner(
        config: HarnessConfig,
        workspace_root: &Path,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let paths = config.resolve_paths(workspace_root);
        Self {
            config,
            paths,
            runner,
            cancel: None,
            state: Mutex::new(BuildState::NotBuilt),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    /// Handle that kills the in-flight process; only for the default runner.
    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.cancel.clone()
    }

    pub fn build_state(&self) -> BuildState {
        self.state.lock().clone()
    }

    pub fn generator_unit(&self) -> SourceUnit {
        SourceUnit::new(GENERATOR_UNIT, self.paths.generator_source.clone())
    }

    pub fn units(&self) -> Vec<SourceUnit> {
        vec![
            self.generator_unit(),
            SourceUnit::new(SCAFFOLD_UNIT, self.paths.scaffold_source.clone()),
        ]
    }

    fn stamp_path(&self) -> PathBuf {
        BuildStamp::path_in(&self.paths.state_dir)
    }

    /// Compile the generator and the scaffold, skipping unchanged units.
    pub fn setup(&self) -> Result<BuildReport, HarnessError> {
        self.setup_with(false)
    }

    /// Compile both units; `force` recompiles even when up to date.
    pub fn setup_with(&self, force: bool) -> Result<BuildReport, HarnessError> {
        let step = BuildStep::new(
            self.runner.as_ref(),
            &self.config.toolchain.compiler,
            self.config.process.build_timeout(),
        );
        let result = step.run(&self.units(), &self.stamp_path(), force);

        let mut state = self.state.lock();
        match &result {
            Ok(report) => *state = BuildState::Built(report.clone()),
            Err(HarnessError::BuildFailed(reason)) => *state = BuildState::Failed(reason.clone()),
            Err(other) => *state = BuildState::Failed(other.to_string()),
        }
        result
    }

    fn ensure_built(&self) -> Result<(), HarnessError> {
        match &*self.state.lock() {
            BuildState::Built(_) => Ok(()),
            BuildState::NotBuilt => Err(HarnessError::NotBuilt),
            BuildState::Failed(reason) => Err(HarnessError::BuildFailed(reason.clone())),
        }
    }

    /// Run the generator for `num_states` and capture its output as
    /// `prismFileTmp_{num_states}_states.sm`.
    ///
    /// The output is staged in a temporary file and renamed over the target
    /// only after the generator exits successfully with non-empty output.
    pub fn create_prism_file(&self, num_states: i64) -> Result<GeneratedModelFile, HarnessError> {
        let num_states = NumStates::new(num_states)?;
        self.ensure_built()?;

        let unit = self.generator_unit();
        let target = GeneratedModelFile::new(num_states, self.paths.output_dir.as_deref());
        let staging_dir = match &self.paths.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.clone()
            }
            None => PathBuf::from("."),
        };

        let staged = tempfile::Builder::new()
            .prefix(".prismFileTmp_")
            .suffix(".partial")
            .tempfile_in(&staging_dir)?;
        let stdout = staged.as_file().try_clone()?;

        let spec = CommandSpec::new(
            self.config.toolchain.runtime.as_str(),
            self.config.process.generate_timeout(),
        )
        .arg("-cp")
        .arg(unit.class_dir())
        .arg(unit.class_name()?)
        .arg(num_states.to_string())
        .stdin(format!("{}\n", num_states));
        info!(num_states = num_states.get(), command = %spec.display(), "Generating model");

        let outcome = self
            .runner
            .run(&spec, StdoutTarget::File(stdout))
            .map_err(|e| HarnessError::GenerationFailed(e.to_string()))?;

        if !outcome.success() {
            return Err(HarnessError::GenerationFailed(format!(
                "`{}` failed with {}{}",
                spec.display(),
                outcome.describe_status(),
                with_diagnostics(&outcome.diagnostics())
            )));
        }

        let written = staged.as_file().metadata()?.len();
        if written == 0 {
            return Err(HarnessError::GenerationFailed(format!(
                "`{}` exited successfully but produced no output{}",
                spec.display(),
                with_diagnostics(&outcome.diagnostics())
            )));
        }

        staged
            .persist(&target.path)
            .map_err(|e| HarnessError::Io(e.error))?;
        info!(
            path = %target.path.display(),
            bytes = written,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Model file written"
        );
        Ok(target)
    }

    /// `create_prism_file` with the default of ten states.
    pub fn create_default_prism_file(&self) -> Result<GeneratedModelFile, HarnessError> {
        self.create_prism_file(i64::from(DEFAULT_NUM_STATES))
    }

    /// Remove every generated model file from the output directory.
    pub fn clean_generated(&self) -> Result<Vec<PathBuf>, HarnessError> {
        let dir = self
            .paths
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry while cleaning");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let Some(num_states) = parse_model_file_name(&name) else {
                continue;
            };
            std::fs::remove_file(entry.path())?;
            let path = match &self.paths.output_dir {
                Some(_) => entry.path().to_path_buf(),
                None => PathBuf::from(entry.file_name()),
            };
            debug!(path = %path.display(), num_states = num_states.get(), "Removed generated model");
            removed.push(path);
        }
        removed.sort();
        Ok(removed)
    }

    /// Source, artifact and stamp state of each unit, plus the in-memory build state.
    pub fn status(&self) -> Result<HarnessStatus, HarnessError> {
        let stamp = BuildStamp::load(&self.stamp_path());
        let mut units = Vec::new();
        for unit in self.units() {
            let artifact = unit.artifact()?;
            let source_exists = unit.source.is_file();
            let artifact_exists = artifact.is_file();
            let up_to_date = source_exists
                && artifact_exists
                && unit
                    .fingerprint()
                    .map(|fp| stamp.is_current(&unit.name, &fp))
                    .unwrap_or(false);
            units.push(UnitStatus {
                name: unit.name.clone(),
                source: display_path(&unit.source),
                artifact: display_path(&artifact),
                source_exists,
                artifact_exists,
                up_to_date,
            });
        }
        Ok(HarnessStatus {
            units,
            build_state: self.build_state().label(),
            output_dir: self
                .paths
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

/// Canonical form when the path exists, otherwise as configured.
fn display_path(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
