//! Shared test utilities for integration tests
//!
//! Provides throwaway workspaces with Java-shaped sources and stub toolchains
//! (executable shell scripts standing in for `javac` and `java`), plus
//! serialized access to process-wide environment variables.

#![allow(dead_code)]

use prism_harness::config::HarnessConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Serializes tests that mutate environment variables or spawn freshly
/// written scripts (a script still open for writing in one thread cannot be
/// executed by a child forked from another).
static PROCESS_ENV_MUTEX: Mutex<()> = Mutex::new(());

pub fn process_lock() -> MutexGuard<'static, ()> {
    PROCESS_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Compiler stand-in: writes `<Source>.class` beside the source.
pub const STUB_COMPILER: &str = r#"#!/bin/sh
src="$1"
case "$src" in
  *.java) ;;
  *) echo "javac: invalid source file: $src" >&2; exit 2 ;;
esac
printf 'compiled\n' > "${src%.java}.class"
"#;

/// Compiler stand-in that always reports a syntax error.
pub const FAILING_COMPILER: &str = r#"#!/bin/sh
echo "$1:3: error: ';' expected" >&2
exit 1
"#;

/// Generator stand-in: `java -cp <dir> <Class> <n>` prints a small CTMC.
pub const STUB_RUNTIME: &str = r#"#!/bin/sh
n="$4"
echo "ctmc"
echo
echo "module M1"
echo "    x : [0..$((n - 1))] init 0;"
echo "endmodule"
"#;

/// Generator stand-in that crashes after printing half a model.
pub const CRASHING_RUNTIME: &str = r#"#!/bin/sh
echo "ctmc"
echo "Exception in thread \"main\" java.lang.ArrayIndexOutOfBoundsException" >&2
exit 1
"#;

/// Generator stand-in that never finishes.
pub const HANGING_RUNTIME: &str = r#"#!/bin/sh
exec sleep 30
"#;

/// A workspace with `src/PrismModelGenerator.java`, `src/scaffoldImportanceSampling.java`
/// and a `bin/` directory for stub tools.
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        fs::write(
            src.join("PrismModelGenerator.java"),
            "public class PrismModelGenerator { public static void main(String[] a) {} }\n",
        )
        .unwrap();
        fs::write(
            src.join("scaffoldImportanceSampling.java"),
            "public class scaffoldImportanceSampling { public static void main(String[] a) {} }\n",
        )
        .unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root().join("models")
    }

    /// Write an executable script under `bin/` and return its absolute path.
    #[cfg(unix)]
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root().join("bin").join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Config pointing at the given compiler/runtime scripts, writing models to `models/`.
    pub fn config(&self, compiler: &Path, runtime: &Path) -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.toolchain.compiler = compiler.to_string_lossy().into_owned();
        config.toolchain.runtime = runtime.to_string_lossy().into_owned();
        config.output.dir = Some(self.models_dir());
        config.process.build_timeout_secs = 30;
        config.process.generate_timeout_secs = 30;
        config
    }

    /// Write `config/config.toml` for layered loading.
    pub fn write_workspace_config(&self, contents: &str) {
        let dir = self.root().join("config");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), contents).unwrap();
    }
}

/// Run `f` with the given environment variables set, restoring the previous
/// values afterwards. Caller must hold [`process_lock`].
pub fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
        .collect();
    for (k, v) in vars {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }

    let result = f();

    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(&k, v),
            None => std::env::remove_var(&k),
        }
    }
    result
}
