//! CLI route: single route table and run context. Dispatches to the harness and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_build_report, format_clean_result, format_config, format_generated, format_status,
};
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::harness::Harness;
use crate::model::DEFAULT_NUM_STATES;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info_span};

/// Runtime context for CLI execution: workspace root, loaded config and the harness.
pub struct RunContext {
    harness: Harness,
    workspace_root: PathBuf,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config: HarnessConfig) -> Result<Self, HarnessError> {
        let harness = Harness::new(config, &workspace_root)?;
        Ok(Self {
            harness,
            workspace_root,
        })
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, HarnessError> {
        let span = info_span!(
            "command",
            name = command_name(command),
            workspace = %self.workspace_root.display()
        );
        let _entered = span.enter();
        let started = Instant::now();
        let result = self.execute_inner(command);
        debug!(
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, HarnessError> {
        match command {
            Commands::Setup { force, format } => {
                let report = self.harness.setup_with(*force)?;
                format_build_report(&report, format)
            }
            Commands::Generate {
                num_states,
                force_build,
                format,
            } => self.handle_generate(num_states, *force_build, format),
            Commands::Clean { format } => {
                let removed = self.harness.clean_generated()?;
                format_clean_result(&removed, format)
            }
            Commands::Status { format } => {
                let status = self.harness.status()?;
                format_status(&status, format)
            }
            Commands::Config => format_config(self.harness.config()),
        }
    }

    fn handle_generate(
        &self,
        num_states: &[i64],
        force_build: bool,
        format: &str,
    ) -> Result<String, HarnessError> {
        let counts: Vec<i64> = if num_states.is_empty() {
            vec![i64::from(DEFAULT_NUM_STATES)]
        } else {
            num_states.to_vec()
        };

        // Reject bad counts before paying for a build.
        for &n in &counts {
            crate::model::NumStates::new(n)?;
        }

        self.harness.setup_with(force_build)?;
        let mut generated = Vec::with_capacity(counts.len());
        for n in counts {
            generated.push(self.harness.create_prism_file(n)?);
        }
        format_generated(&generated, format)
    }
}
