//! Running generated commands in a shell with a timeout.

use std::{
    io::{BufReader, Read},
    path::Path,
    process, thread,
    time::{Duration, Instant},
};

use serde_derive::{Deserialize, Serialize};
use wait_timeout::ChildExt;

/// Outcome of running a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// Captured stdout
    pub output: String,
    /// Captured stderr, or the reason the command could not run
    pub error: String,
    /// Process exit code, `-1` when killed or never started
    pub return_code: i32,
    /// Wall clock seconds
    pub execution_time: f64,
}

impl ExecutionResult {
    #[must_use]
    pub fn failed(error: impl Into<String>, execution_time: f64) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: error.into(),
            return_code: -1,
            execution_time,
        }
    }
}

/// Program and arguments that run `command` in the platform shell.
#[must_use]
pub fn shell_invocation(command: &str) -> (&'static str, Vec<String>) {
    if cfg!(windows) {
        (
            "powershell.exe",
            vec![
                "-NoLogo".into(),
                "-NoProfile".into(),
                "-Command".into(),
                command.into(),
            ],
        )
    } else {
        ("sh", vec!["-c".into(), command.into()])
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut output = String::new();
        if let Some(pipe) = pipe {
            let mut reader = BufReader::new(pipe);
            let _ = reader.read_to_string(&mut output);
        }
        output
    })
}

/// Run `command` in the platform shell, killing it after `timeout`.
///
/// Never fails: spawn errors and timeouts become a failed [`ExecutionResult`].
#[must_use]
pub fn run_shell(command: &str, timeout: Duration, cwd: Option<&Path>) -> ExecutionResult {
    let started = Instant::now();
    let (program, args) = shell_invocation(command);

    let mut cmd = process::Command::new(program);
    cmd.args(&args)
        .stdin(process::Stdio::null())
        .stdout(process::Stdio::piped())
        .stderr(process::Stdio::piped());
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            tracing::warn!(error = %err, program, "could not start shell");
            return ExecutionResult::failed(
                format!("Failed to execute command: {err}"),
                started.elapsed().as_secs_f64(),
            );
        }
    };

    // Drain both pipes while waiting so a chatty process never blocks on a
    // full pipe buffer.
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    match child.wait_timeout(timeout) {
        Ok(Some(status)) => {
            let output = stdout.join().unwrap_or_default();
            let error = stderr.join().unwrap_or_default();
            ExecutionResult {
                success: status.success(),
                output: output.trim_end().to_string(),
                error: error.trim_end().to_string(),
                return_code: status.code().unwrap_or(-1),
                execution_time: started.elapsed().as_secs_f64(),
            }
        }
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            // readers are left detached, grandchildren may still hold the pipes
            tracing::warn!(timeout_secs = timeout.as_secs(), "command timed out");
            ExecutionResult::failed(
                format!("Command timed out after {} seconds", timeout.as_secs()),
                started.elapsed().as_secs_f64(),
            )
        }
        Err(err) => {
            let _ = child.kill();
            ExecutionResult::failed(
                format!("Failed to execute command: {err}"),
                started.elapsed().as_secs_f64(),
            )
        }
    }
}
