//! Abstractions over external command execution and metric sources.
//!
//! The `CommandRunner` trait allows collectors to run the real `zfs` binary
//! or a scripted mock in tests.

use std::io;
use std::process::{Command, ExitStatus};

use super::{CollectError, Sample};

/// Result of a finished external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `true` when the command exited with status 0.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub status: Option<i32>,
    /// Signal that terminated the command. Always `None` off Unix.
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Abstraction for running external commands.
pub trait CommandRunner {
    /// Runs `program` with `args` to completion and captures its output.
    ///
    /// # Returns
    /// The captured output, or an I/O error if the command could not be started.
    fn run(&mut self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

/// Runner that spawns real processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a new `SystemRunner` instance.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.code(),
            signal: terminating_signal(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Source of per-resource metric values.
pub trait MetricSource {
    /// Fetches the current value for every name in one batched query.
    ///
    /// Names the source does not report are absent from the result.
    fn collect(&mut self, names: &[String]) -> Result<Sample, CollectError>;
}

/// Lists every resource name known to the system.
pub trait Inventory {
    fn list_names(&mut self) -> Result<Vec<String>, CollectError>;
}
