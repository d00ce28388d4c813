//! Build step: compiles the external source units.
//!
//! Each unit is compiled with `<compiler> <source>`, which places the class
//! file beside the source. A JSON build stamp records the BLAKE3 fingerprint
//! of every source that compiled successfully, so an unchanged unit with its
//! artifact present is skipped on the next run.

use crate::error::HarnessError;
use crate::process::{CommandSpec, ProcessRunner, StdoutTarget};
use blake3::Hasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// File name of the build stamp inside the state directory.
pub const STAMP_FILE_NAME: &str = "build-stamp.json";

/// One external program to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub name: String,
    pub source: PathBuf,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Class name the runtime is asked to load: the source file stem.
    pub fn class_name(&self) -> Result<String, HarnessError> {
        self.source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| {
                HarnessError::ConfigError(format!(
                    "{} source path {} has no file name",
                    self.name,
                    self.source.display()
                ))
            })
    }

    /// Directory the compiled class lands in, used as the runtime classpath.
    pub fn class_dir(&self) -> PathBuf {
        match self.source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn artifact(&self) -> Result<PathBuf, HarnessError> {
        Ok(self.class_dir().join(format!("{}.class", self.class_name()?)))
    }

    /// BLAKE3 hex digest of the source file contents.
    pub fn fingerprint(&self) -> Result<String, HarnessError> {
        let mut file = std::fs::File::open(&self.source).map_err(|e| {
            HarnessError::BuildFailed(format!(
                "{} source {} is not readable: {}",
                self.name,
                self.source.display(),
                e
            ))
        })?;
        let mut hasher = Hasher::new();
        let mut buf = [0u8; 8192];
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }
        Ok(hex::encode(hasher.finalize().as_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOutcome {
    Compiled,
    UpToDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub name: String,
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub outcome: UnitOutcome,
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Outcome of one successful `setup` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub units: Vec<UnitReport>,
    pub finished_at: DateTime<Utc>,
}

impl BuildReport {
    pub fn compiled_count(&self) -> usize {
        self.count(UnitOutcome::Compiled)
    }

    pub fn up_to_date_count(&self) -> usize {
        self.count(UnitOutcome::UpToDate)
    }

    fn count(&self, outcome: UnitOutcome) -> usize {
        self.units.iter().filter(|u| u.outcome == outcome).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampEntry {
    pub fingerprint: String,
    pub compiled_at: DateTime<Utc>,
}

/// Persisted fingerprints of the sources behind the current artifacts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStamp {
    #[serde(default)]
    pub units: BTreeMap<String, StampEntry>,
}

impl BuildStamp {
    pub fn path_in(state_dir: &Path) -> PathBuf {
        state_dir.join(STAMP_FILE_NAME)
    }

    /// Load the stamp. A missing file is an empty stamp; an unreadable one is
    /// discarded with a warning, which only costs a recompile.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read build stamp, ignoring it");
                return Self::default();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Corrupt build stamp, ignoring it");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), HarnessError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn is_current(&self, unit: &str, fingerprint: &str) -> bool {
        self.units
            .get(unit)
            .map(|entry| entry.fingerprint == fingerprint)
            .unwrap_or(false)
    }

    pub fn record(&mut self, unit: &str, fingerprint: String) {
        self.units.insert(
            unit.to_string(),
            StampEntry {
                fingerprint,
                compiled_at: Utc::now(),
            },
        );
    }
}

/// Compiles source units with one compiler command.
pub struct BuildStep<'a> {
    runner: &'a dyn ProcessRunner,
    compiler: &'a str,
    timeout: Duration,
}

impl<'a> BuildStep<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, compiler: &'a str, timeout: Duration) -> Self {
        Self {
            runner,
            compiler,
            timeout,
        }
    }

    /// Compile every unit that is stale (or all of them when `force`).
    ///
    /// Units are processed in order and the first failure stops the run. The
    /// stamp is written even on failure so units that did compile are kept.
    pub fn run(
        &self,
        units: &[SourceUnit],
        stamp_path: &Path,
        force: bool,
    ) -> Result<BuildReport, HarnessError> {
        let mut stamp = BuildStamp::load(stamp_path);
        let mut reports = Vec::with_capacity(units.len());

        for unit in units {
            match self.build_unit(unit, &mut stamp, force) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    if let Err(save_err) = stamp.save(stamp_path) {
                        warn!(error = %save_err, "Failed to persist build stamp after build failure");
                    }
                    return Err(e);
                }
            }
        }

        stamp.save(stamp_path)?;
        let report = BuildReport {
            units: reports,
            finished_at: Utc::now(),
        };
        info!(
            compiled = report.compiled_count(),
            up_to_date = report.up_to_date_count(),
            "Build step finished"
        );
        Ok(report)
    }

    fn build_unit(
        &self,
        unit: &SourceUnit,
        stamp: &mut BuildStamp,
        force: bool,
    ) -> Result<UnitReport, HarnessError> {
        if !unit.source.is_file() {
            return Err(HarnessError::BuildFailed(format!(
                "{} source not found: {}",
                unit.name,
                unit.source.display()
            )));
        }

        let fingerprint = unit.fingerprint()?;
        let artifact = unit.artifact()?;

        if !force && artifact.is_file() && stamp.is_current(&unit.name, &fingerprint) {
            debug!(unit = %unit.name, artifact = %artifact.display(), "Unit up to date");
            return Ok(UnitReport {
                name: unit.name.clone(),
                source: unit.source.clone(),
                artifact,
                outcome: UnitOutcome::UpToDate,
                fingerprint,
                elapsed_ms: None,
            });
        }

        let spec = CommandSpec::new(self.compiler, self.timeout).arg(&unit.source);
        info!(unit = %unit.name, command = %spec.display(), "Compiling unit");

        let outcome = self
            .runner
            .run(&spec, StdoutTarget::Capture)
            .map_err(|e| HarnessError::BuildFailed(format!("{}: {}", unit.name, e)))?;

        if !outcome.success() {
            return Err(HarnessError::BuildFailed(format!(
                "{}: `{}` failed with {}{}",
                unit.name,
                spec.display(),
                outcome.describe_status(),
                with_diagnostics(&outcome.diagnostics())
            )));
        }

        if !artifact.is_file() {
            return Err(HarnessError::BuildFailed(format!(
                "{}: `{}` succeeded but produced no artifact at {}",
                unit.name,
                spec.display(),
                artifact.display()
            )));
        }

        stamp.record(&unit.name, fingerprint.clone());
        Ok(UnitReport {
            name: unit.name.clone(),
            source: unit.source.clone(),
            artifact,
            outcome: UnitOutcome::Compiled,
            fingerprint,
            elapsed_ms: Some(outcome.elapsed.as_millis() as u64),
        })
    }
}

pub(crate) fn with_diagnostics(diagnostics: &str) -> String {
    if diagnostics.is_empty() {
        String::new()
    } else {
        format!(":\n{}", diagnostics)
    }
}
