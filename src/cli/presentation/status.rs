//! Status and config formatters.

use super::to_json;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::harness::HarnessStatus;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

pub fn format_status(status: &HarnessStatus, format: &str) -> Result<String, HarnessError> {
    if format == "json" {
        return to_json(status);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Unit", "Source", "Artifact", "Stamp"]);
    for unit in &status.units {
        let source = presence(unit.source_exists, &unit.source.display().to_string());
        let artifact = presence(unit.artifact_exists, &unit.artifact.display().to_string());
        let stamp = if unit.up_to_date {
            "up to date".green().to_string()
        } else {
            "stale".yellow().to_string()
        };
        table.add_row(vec![unit.name.clone(), source, artifact, stamp]);
    }

    Ok(format!(
        "{}\nBuild state (this process): {}\nOutput directory: {}",
        table,
        status.build_state,
        status.output_dir.display()
    ))
}

fn presence(exists: bool, path: &str) -> String {
    if exists {
        path.to_string()
    } else {
        format!("{} {}", path, "(missing)".red())
    }
}

pub fn format_config(config: &HarnessConfig) -> Result<String, HarnessError> {
    toml::to_string_pretty(config)
        .map_err(|e| HarnessError::ConfigError(format!("Failed to render configuration: {}", e)))
}
