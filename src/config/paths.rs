//! Platform directories for user-level config and logs.

use directories::ProjectDirs;
use std::path::PathBuf;

const APPLICATION: &str = "prism-harness";

/// Project directories for the harness; `None` when no home directory can be determined.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION)
}

/// Path to the user-level config file, e.g. `$XDG_CONFIG_HOME/prism-harness/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Default log file location under the platform state (or data) directory.
pub fn default_log_file_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| {
        dirs.state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .join("prism-harness.log")
    })
}
