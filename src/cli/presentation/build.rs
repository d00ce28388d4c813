//! Build, generate and clean result formatters.

use super::to_json;
use crate::build::{BuildReport, UnitOutcome};
use crate::error::HarnessError;
use crate::model::GeneratedModelFile;
use std::path::PathBuf;

pub fn format_build_report(report: &BuildReport, format: &str) -> Result<String, HarnessError> {
    if format == "json" {
        return to_json(report);
    }
    let mut lines = vec![format!(
        "Build complete: {} compiled, {} up to date",
        report.compiled_count(),
        report.up_to_date_count()
    )];
    for unit in &report.units {
        let detail = match (unit.outcome, unit.elapsed_ms) {
            (UnitOutcome::Compiled, Some(ms)) => format!("compiled in {} ms", ms),
            (UnitOutcome::Compiled, None) => "compiled".to_string(),
            (UnitOutcome::UpToDate, _) => "up to date".to_string(),
        };
        lines.push(format!(
            "  {}: {} -> {}",
            unit.name,
            detail,
            unit.artifact.display()
        ));
    }
    Ok(lines.join("\n"))
}

/// One path per line, the way callers consume the returned file names.
pub fn format_generated(files: &[GeneratedModelFile], format: &str) -> Result<String, HarnessError> {
    if format == "json" {
        return to_json(files);
    }
    Ok(files
        .iter()
        .map(|f| f.path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn format_clean_result(removed: &[PathBuf], format: &str) -> Result<String, HarnessError> {
    if format == "json" {
        return to_json(&serde_json::json!({ "removed": removed }));
    }
    if removed.is_empty() {
        return Ok("No generated model files to remove.".to_string());
    }
    let mut lines = vec![format!("Removed {} model file(s):", removed.len())];
    lines.extend(removed.iter().map(|p| format!("  {}", p.display())));
    Ok(lines.join("\n"))
}
