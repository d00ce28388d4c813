//! External process execution.
//!
//! Every process the harness launches goes through a [`ProcessRunner`]. The
//! default runner drives `tokio::process` on a private runtime so that each
//! wait is bounded by a timeout and can be cancelled from another thread.
//! Arguments are always passed as a list; nothing is interpreted by a shell.

use crate::error::ProcessError;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Longest stderr excerpt carried into error messages.
const STDERR_EXCERPT_LIMIT: usize = 2000;

/// A single process invocation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
    /// Bytes written to the child's stdin, which is then closed.
    pub stdin: Option<Vec<u8>>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            stdin: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Human-readable command line for logs and error messages.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Where a child's standard output goes.
#[derive(Debug)]
pub enum StdoutTarget {
    /// Collect into [`ProcessOutcome::stdout`].
    Capture,
    /// Write straight into an already-open file.
    File(std::fs::File),
}

/// Result of a process that ran to completion (successfully or not).
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn describe_status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    /// Tail of stderr (falling back to captured stdout), trimmed for error messages.
    pub fn diagnostics(&self) -> String {
        let raw = if self.stderr.iter().any(|b| !b.is_ascii_whitespace()) {
            &self.stderr
        } else {
            &self.stdout
        };
        let text = String::from_utf8_lossy(raw);
        let text = text.trim();
        if text.len() <= STDERR_EXCERPT_LIMIT {
            return text.to_string();
        }
        let mut start = text.len() - STDERR_EXCERPT_LIMIT;
        while !text.is_char_boundary(start) {
            start += 1;
        }
        format!("...{}", &text[start..])
    }
}

/// Seam for launching external processes.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec, stdout: StdoutTarget) -> Result<ProcessOutcome, ProcessError>;
}

/// Cancels whatever process the owning runner is currently waiting on.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    notify: Arc<Notify>,
}

impl CancelHandle {
    /// Kill every in-flight process of the runner. Runs started afterwards are unaffected.
    pub fn cancel(&self) {
        self.notify.notify_waiters();
    }
}

/// Default runner backed by `tokio::process`.
///
/// Calls block the current thread. They must not be made from inside another
/// tokio runtime.
pub struct TokioProcessRunner {
    runtime: tokio::runtime::Runtime,
    cancel: CancelHandle,
}

impl TokioProcessRunner {
    pub fn new() -> Result<Self, ProcessError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("prism-harness-process")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            cancel: CancelHandle::default(),
        })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    async fn run_async(
        &self,
        spec: &CommandSpec,
        stdout: StdoutTarget,
    ) -> Result<ProcessOutcome, ProcessError> {
        // Register interest before spawning so a cancel issued right after spawn is not lost.
        let cancelled = self.cancel.notify.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let mut command = tokio::process::Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        match stdout {
            StdoutTarget::Capture => {
                command.stdout(Stdio::piped());
            }
            StdoutTarget::File(file) => {
                command.stdout(Stdio::from(file));
            }
        }
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        debug!(command = %spec.display(), pid = ?child.id(), "Process started");

        // Feed stdin on its own task so a child that never reads cannot stall the wait.
        if let (Some(input), Some(mut pipe)) = (spec.stdin.clone(), child.stdin.take()) {
            let program = spec.program.clone();
            tokio::spawn(async move {
                if let Err(e) = pipe.write_all(&input).await {
                    debug!(program = %program, error = %e, "Child did not consume stdin");
                }
            });
        }

        // Dropping the child on timeout or cancellation kills it (kill_on_drop).
        let output = tokio::select! {
            result = child.wait_with_output() => result?,
            _ = tokio::time::sleep(spec.timeout) => {
                warn!(command = %spec.display(), timeout = ?spec.timeout, "Process timed out, killing");
                return Err(ProcessError::TimedOut {
                    program: spec.program.clone(),
                    timeout: spec.timeout,
                });
            }
            _ = &mut cancelled => {
                warn!(command = %spec.display(), "Process cancelled, killing");
                return Err(ProcessError::Cancelled {
                    program: spec.program.clone(),
                });
            }
        };

        let outcome = ProcessOutcome {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            elapsed: started.elapsed(),
        };
        debug!(
            command = %spec.display(),
            status = %outcome.describe_status(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Process finished"
        );
        Ok(outcome)
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn run(&self, spec: &CommandSpec, stdout: StdoutTarget) -> Result<ProcessOutcome, ProcessError> {
        self.runtime.block_on(self.run_async(spec, stdout))
    }
}
