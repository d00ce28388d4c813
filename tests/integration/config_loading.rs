//! Layered configuration loading: defaults, global file, workspace files, environment.

use crate::integration::test_utils::*;
use prism_harness::config::ConfigLoader;
use prism_harness::error::HarnessError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Environment with no ambient overrides and an empty config home.
fn isolated_env(config_home: &TempDir) -> Vec<(&'static str, Option<String>)> {
    vec![
        (
            "XDG_CONFIG_HOME",
            Some(config_home.path().to_string_lossy().into_owned()),
        ),
        ("PRISM_HARNESS_ENV", None),
        ("PRISM_HARNESS__PROCESS__GENERATE_TIMEOUT_SECS", None),
        ("PRISM_HARNESS__TOOLCHAIN__RUNTIME", None),
    ]
}

fn with_isolated_env<R>(
    config_home: &TempDir,
    extra: &[(&'static str, Option<&str>)],
    f: impl FnOnce() -> R,
) -> R {
    let base = isolated_env(config_home);
    let mut vars: Vec<(&str, Option<&str>)> =
        base.iter().map(|(k, v)| (*k, v.as_deref())).collect();
    vars.extend_from_slice(extra);
    with_env(&vars, f)
}

#[test]
fn test_defaults_without_any_files() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();

    let config = with_isolated_env(&home, &[], || ConfigLoader::load(ws.root())).unwrap();
    assert_eq!(config.toolchain.compiler, "javac");
    assert_eq!(config.toolchain.runtime, "java");
    assert_eq!(config.process.generate_timeout_secs, 60);
    assert!(config.output.dir.is_none());
}

#[test]
fn test_workspace_file_overrides_defaults() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();
    ws.write_workspace_config(
        r#"
[toolchain]
runtime = "/opt/jdk/bin/java"

[output]
dir = "models"
"#,
    );

    let config = with_isolated_env(&home, &[], || ConfigLoader::load(ws.root())).unwrap();
    assert_eq!(config.toolchain.runtime, "/opt/jdk/bin/java");
    assert_eq!(config.toolchain.compiler, "javac");
    assert_eq!(config.output.dir, Some(PathBuf::from("models")));
}

#[test]
fn test_env_specific_workspace_file_layers_on_base() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();
    ws.write_workspace_config("[process]\ngenerate_timeout_secs = 30\nbuild_timeout_secs = 90\n");
    fs::write(
        ws.root().join("config/ci.toml"),
        "[process]\ngenerate_timeout_secs = 5\n",
    )
    .unwrap();

    let config = with_isolated_env(&home, &[("PRISM_HARNESS_ENV", Some("ci"))], || {
        ConfigLoader::load(ws.root())
    })
    .unwrap();
    assert_eq!(config.process.generate_timeout_secs, 5);
    assert_eq!(config.process.build_timeout_secs, 90);
}

#[test]
fn test_environment_overrides_files() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();
    ws.write_workspace_config("[process]\ngenerate_timeout_secs = 30\n");

    let config = with_isolated_env(
        &home,
        &[
            ("PRISM_HARNESS__PROCESS__GENERATE_TIMEOUT_SECS", Some("7")),
            ("PRISM_HARNESS__TOOLCHAIN__RUNTIME", Some("java17")),
        ],
        || ConfigLoader::load(ws.root()),
    )
    .unwrap();
    assert_eq!(config.process.generate_timeout_secs, 7);
    assert_eq!(config.toolchain.runtime, "java17");
}

#[test]
fn test_global_file_sits_below_workspace_file() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();
    let global_dir = home.path().join("prism-harness");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        "[toolchain]\ncompiler = \"/global/javac\"\nruntime = \"/global/java\"\n",
    )
    .unwrap();
    ws.write_workspace_config("[toolchain]\nruntime = \"/workspace/java\"\n");

    let config = with_isolated_env(&home, &[], || ConfigLoader::load(ws.root())).unwrap();
    assert_eq!(config.toolchain.compiler, "/global/javac");
    assert_eq!(config.toolchain.runtime, "/workspace/java");
}

#[test]
fn test_invalid_values_are_config_errors() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();
    ws.write_workspace_config("[process]\ngenerate_timeout_secs = 0\n");

    let err = with_isolated_env(&home, &[], || ConfigLoader::load(ws.root())).unwrap_err();
    match err {
        HarnessError::ConfigError(msg) => assert!(msg.contains("generate_timeout_secs"), "{}", msg),
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_explicit_config_file_must_exist() {
    let _lock = process_lock();
    let ws = TestWorkspace::new();
    let home = TempDir::new().unwrap();

    let missing = ws.root().join("nope.toml");
    let err = with_isolated_env(&home, &[], || ConfigLoader::load_from_file(&missing)).unwrap_err();
    assert!(matches!(err, HarnessError::ConfigError(msg) if msg.contains("not found")));
}
