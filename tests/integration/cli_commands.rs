//! Binary-level tests: run `prism-harness` in a stub workspace.

use crate::integration::test_utils::*;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliWorkspace {
    ws: TestWorkspace,
    config_home: TempDir,
}

impl CliWorkspace {
    /// Workspace whose `config/config.toml` points at stub tools; models land in the cwd.
    fn new(runtime_body: &str) -> Self {
        let ws = TestWorkspace::new();
        let compiler = ws.script("javac", STUB_COMPILER);
        let runtime = ws.script("java", runtime_body);
        ws.write_workspace_config(&format!(
            "[toolchain]\ncompiler = \"{}\"\nruntime = \"{}\"\n\n[process]\ngenerate_timeout_secs = 30\n",
            compiler.display(),
            runtime.display()
        ));
        Self {
            ws,
            config_home: TempDir::new().unwrap(),
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_prism-harness"))
            .args(args)
            .current_dir(self.ws.root())
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("HOME", self.config_home.path())
            .env_remove("PRISM_HARNESS_ENV")
            .env_remove("PRISM_HARNESS_LOG")
            .env_remove("PRISM_HARNESS_LOG_FORMAT")
            .env_remove("PRISM_HARNESS_LOG_OUTPUT")
            .output()
            .expect("failed to run prism-harness")
    }
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_generate_prints_relative_file_name() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let output = cli.run(&["generate", "3"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output).trim(), "prismFileTmp_3_states.sm");

    let model = cli.ws.root().join("prismFileTmp_3_states.sm");
    let contents = fs::read_to_string(model).unwrap();
    assert!(contents.contains("x : [0..2] init 0;"));
}

#[test]
fn test_generate_defaults_to_ten_states() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let output = cli.run(&["generate"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output).trim(), "prismFileTmp_10_states.sm");
}

#[test]
fn test_generate_several_counts() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let output = cli.run(&["generate", "2", "4"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let lines: Vec<String> = stdout_of(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec!["prismFileTmp_2_states.sm", "prismFileTmp_4_states.sm"]
    );
}

#[test]
fn test_generate_rejects_non_positive_counts() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    for bad in ["0", "-1"] {
        let output = cli.run(&["generate", bad]);
        assert!(!output.status.success());
        assert!(
            stderr_of(&output).contains("Invalid input"),
            "stderr: {}",
            stderr_of(&output)
        );
    }
    // Validation happens before the build step.
    assert!(!cli.ws.root().join("src/PrismModelGenerator.class").exists());
}

#[test]
fn test_generate_failure_exits_non_zero() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(CRASHING_RUNTIME);

    let output = cli.run(&["generate", "3"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Generation failed"));
    assert!(!cli.ws.root().join("prismFileTmp_3_states.sm").exists());
}

#[test]
fn test_setup_twice_reports_up_to_date() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let first = cli.run(&["setup"]);
    assert!(first.status.success(), "stderr: {}", stderr_of(&first));
    assert!(stdout_of(&first).contains("2 compiled"));

    let second = cli.run(&["setup"]);
    assert!(second.status.success());
    assert!(stdout_of(&second).contains("0 compiled, 2 up to date"));

    let forced = cli.run(&["setup", "--force"]);
    assert!(stdout_of(&forced).contains("2 compiled"));
}

#[test]
fn test_setup_json_output() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let output = cli.run(&["setup", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let units = report["units"].as_array().unwrap();
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|u| u["outcome"] == "compiled"));
}

#[test]
fn test_clean_removes_generated_models() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);
    assert!(cli.run(&["generate", "3", "5"]).status.success());
    fs::write(cli.ws.root().join("notes.sm"), "not generated").unwrap();

    let output = cli.run(&["clean"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Removed 2 model file(s)"));
    assert!(!cli.ws.root().join("prismFileTmp_3_states.sm").exists());
    assert!(cli.ws.root().join("notes.sm").exists());

    let again = cli.run(&["clean"]);
    assert!(stdout_of(&again).contains("No generated model files"));
}

#[test]
fn test_status_json_after_setup() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);
    assert!(cli.run(&["setup"]).status.success());

    let output = cli.run(&["status", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let units = status["units"].as_array().unwrap();
    assert_eq!(units.len(), 2);
    assert!(units
        .iter()
        .all(|u| u["artifact_exists"] == true && u["up_to_date"] == true));
    // Each invocation is a fresh process.
    assert_eq!(status["build_state"], "not built");
}

#[test]
fn test_config_prints_effective_toml() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let output = cli.run(&["config"]);
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let rendered: toml::Value = toml::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(rendered["process"]["generate_timeout_secs"].as_integer(), Some(30));
    assert!(rendered["toolchain"]["runtime"]
        .as_str()
        .unwrap()
        .ends_with("bin/java"));
}

#[test]
fn test_missing_explicit_config_file() {
    let _lock = process_lock();
    let cli = CliWorkspace::new(STUB_RUNTIME);

    let output = cli.run(&["--config", "missing.toml", "status"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Config file not found"));
}
