//! Scripted command runner for testing collectors without a real `zfs`.
//!
//! Each call to [`CommandRunner::run`] consumes the next scripted response
//! and records the full command line, so tests can assert both what was
//! asked and what came back.

use std::collections::VecDeque;
use std::io;

use super::traits::{CommandOutput, CommandRunner};

#[derive(Debug, Clone)]
enum Scripted {
    Output(CommandOutput),
    SpawnError(io::ErrorKind),
}

/// Command runner that replays scripted responses in order.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    responses: VecDeque<Scripted>,
    calls: Vec<Vec<String>>,
}

impl MockRunner {
    /// Creates a runner with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful run printing `stdout`.
    pub fn push_stdout(&mut self, stdout: impl Into<String>) -> &mut Self {
        self.responses.push_back(Scripted::Output(CommandOutput {
            success: true,
            status: Some(0),
            signal: None,
            stdout: stdout.into(),
            stderr: String::new(),
        }));
        self
    }

    /// Queues a successful `zfs get -H -p -o name,value` run.
    pub fn push_values(&mut self, values: &[(&str, u64)]) -> &mut Self {
        self.push_stdout(zfs_get_output(values))
    }

    /// Queues a run that exits with `status` and prints `stderr`.
    pub fn push_failure(&mut self, status: i32, stderr: impl Into<String>) -> &mut Self {
        self.responses.push_back(Scripted::Output(CommandOutput {
            success: false,
            status: Some(status),
            signal: None,
            stdout: String::new(),
            stderr: stderr.into(),
        }));
        self
    }

    /// Queues a run killed by `signal` before it printed anything.
    pub fn push_signal(&mut self, signal: i32) -> &mut Self {
        self.responses.push_back(Scripted::Output(CommandOutput {
            success: false,
            status: None,
            signal: Some(signal),
            stdout: String::new(),
            stderr: String::new(),
        }));
        self
    }

    /// Queues a run whose command cannot be started.
    pub fn push_spawn_error(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.responses.push_back(Scripted::SpawnError(kind));
        self
    }

    /// Command lines seen so far, program first.
    pub fn calls(&self) -> &[Vec<String>] {
        &self.calls
    }

    /// Number of scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.len()
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let mut call = Vec::with_capacity(args.len() + 1);
        call.push(program.to_string());
        call.extend(args.iter().cloned());
        self.calls.push(call);

        match self.responses.pop_front() {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::SpawnError(kind)) => Err(io::Error::new(kind, "scripted spawn error")),
            None => Err(io::Error::other("mock runner has no scripted response left")),
        }
    }
}

/// Renders `values` the way `zfs get -H -p -o name,value` prints them.
pub fn zfs_get_output(values: &[(&str, u64)]) -> String {
    values
        .iter()
        .map(|(name, value)| format!("{}\t{}\n", name, value))
        .collect()
}
