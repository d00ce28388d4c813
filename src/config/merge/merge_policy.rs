//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key:
//! defaults < global file < workspace base file < workspace env file < environment.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix for environment overrides, e.g. `PRISM_HARNESS__TOOLCHAIN__RUNTIME`.
pub const ENV_PREFIX: &str = "PRISM_HARNESS";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("toolchain.compiler", "javac")?
        .set_default("toolchain.runtime", "java")?
        .set_default("sources.generator", "src/PrismModelGenerator.java")?
        .set_default("sources.scaffold", "src/scaffoldImportanceSampling.java")?
        .set_default("process.build_timeout_secs", 120)?
        .set_default("process.generate_timeout_secs", 60)?
        .set_default("state.dir", ".prism-harness")
}

/// Environment overrides always apply last.
pub fn add_environment(
    builder: ConfigBuilder<DefaultState>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
