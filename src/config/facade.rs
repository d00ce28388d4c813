//! Config loader facade: the single entry point for building a [`HarnessConfig`].

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::HarnessConfig;
use crate::error::HarnessError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load layered configuration for a workspace:
    /// defaults, global file, workspace files, environment.
    pub fn load(workspace_root: &Path) -> Result<HarnessConfig, HarnessError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder);
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let builder = merge_policy::add_environment(builder);

        let config: HarnessConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load configuration from one explicit file (plus defaults and environment).
    pub fn load_from_file(path: &Path) -> Result<HarnessConfig, HarnessError> {
        if !path.is_file() {
            return Err(HarnessError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!(config_path = %path.display(), "Loading configuration file");
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = merge_policy::add_environment(builder);

        let config: HarnessConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    fn validated(config: HarnessConfig) -> Result<HarnessConfig, HarnessError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            HarnessError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
