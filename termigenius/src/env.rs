//! Environment abstraction for testability.
//!
//! Provides the [`Environment`] trait to abstract all external I/O
//! (env vars, filesystem, subprocesses), enabling fully sandboxed testing.

use std::{
    collections::{HashMap, HashSet},
    io::{BufReader, Read as _},
    path::{Path, PathBuf},
    process,
    sync::Mutex,
    thread,
    time::Duration,
};

use wait_timeout::ChildExt;

use crate::{
    executor::{run_shell, ExecutionResult},
    Result,
};

/// Abstracts all interaction with the operating system.
///
/// The real application uses [`RealEnvironment`]; tests inject
/// [`MockEnvironment`] so that nothing touches the real system.
pub trait Environment: Send + Sync {
    /// Read an environment variable.
    fn var(&self, key: &str) -> Option<String>;

    /// Get the current working directory.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be determined.
    fn current_dir(&self) -> Result<PathBuf>;

    /// Check if a path exists (file or directory).
    fn path_exists(&self, path: &Path) -> bool;

    /// Get the user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Run a short probe command and return its stdout, or `None` on
    /// failure/timeout.
    fn run_command(&self, cmd: &str, args: &[&str], timeout_ms: u64) -> Option<String>;

    /// Run a user command in the platform shell.
    fn execute(&self, command: &str, timeout: Duration, cwd: Option<&Path>) -> ExecutionResult;
}

// ---------------------------------------------------------------------------
// Real implementation (used in production)
// ---------------------------------------------------------------------------

/// Production [`Environment`] backed by the real OS.
pub struct RealEnvironment;

impl Environment for RealEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(std::env::current_dir()?)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn run_command(&self, cmd: &str, args: &[&str], timeout_ms: u64) -> Option<String> {
        let mut child = process::Command::new(cmd)
            .args(args)
            .stdin(process::Stdio::null())
            .stdout(process::Stdio::piped())
            .stderr(process::Stdio::null())
            .spawn()
            .ok()?;

        // Read stdout in a separate thread to prevent pipe buffer deadlock.
        let stdout = child.stdout.take()?;
        let reader_handle = thread::spawn(move || {
            let mut output = String::new();
            let mut reader = BufReader::new(stdout);
            let _ = reader.read_to_string(&mut output);
            output
        });

        let timeout = Duration::from_millis(timeout_ms);
        match child.wait_timeout(timeout) {
            Ok(Some(status)) if status.success() => {
                reader_handle.join().ok().map(|o| o.trim().to_string())
            }
            Ok(Some(_)) | Err(_) => None,
            Ok(None) => {
                // Timeout, kill the child (closes pipe, unblocks reader)
                let _ = child.kill();
                let _ = child.wait();
                let _ = reader_handle.join();
                None
            }
        }
    }

    fn execute(&self, command: &str, timeout: Duration, cwd: Option<&Path>) -> ExecutionResult {
        run_shell(command, timeout, cwd)
    }
}

// ---------------------------------------------------------------------------
// Mock implementation (used in tests, zero real I/O)
// ---------------------------------------------------------------------------

/// A fully in-memory [`Environment`] for sandboxed testing.
///
/// Every field is public so tests can construct scenarios declaratively.
#[derive(Debug, Default)]
pub struct MockEnvironment {
    pub env_vars: HashMap<String, String>,
    pub cwd: PathBuf,
    pub existing_paths: HashSet<PathBuf>,
    pub home: Option<PathBuf>,
    /// Maps `"cmd arg1 arg2"` to stdout output.
    pub command_outputs: HashMap<String, String>,
    /// Maps a user command to its execution result. Unknown commands succeed
    /// with empty output.
    pub executions: HashMap<String, ExecutionResult>,
    /// Every command passed to [`Environment::execute`], in order.
    pub executed: Mutex<Vec<String>>,
}

impl MockEnvironment {
    /// Commands executed so far.
    #[must_use]
    pub fn executed_commands(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|executed| executed.clone())
            .unwrap_or_default()
    }
}

impl Environment for MockEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.env_vars.get(key).cloned()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.existing_paths.contains(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn run_command(&self, cmd: &str, args: &[&str], _timeout_ms: u64) -> Option<String> {
        let key = format!("{} {}", cmd, args.join(" "));
        self.command_outputs.get(&key).cloned()
    }

    fn execute(&self, command: &str, _timeout: Duration, _cwd: Option<&Path>) -> ExecutionResult {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(command.to_string());
        }
        self.executions
            .get(command)
            .cloned()
            .unwrap_or_else(|| ExecutionResult {
                success: true,
                output: String::new(),
                error: String::new(),
                return_code: 0,
                execution_time: 0.0,
            })
    }
}
