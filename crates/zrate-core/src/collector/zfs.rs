//! Collector backed by the `zfs` command line tool.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, trace};

use super::traits::{CommandRunner, Inventory, MetricSource};
use super::{CollectError, Sample};

/// POSIX `SIGINT`, delivered to the whole foreground group on Ctrl-C.
const SIGINT: i32 = 2;

/// Program and leading arguments used to invoke `zfs`.
///
/// Parsed from a command line such as `"zfs"` or `"sudo -n zfs"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZfsCommand {
    program: String,
    prefix: Vec<String>,
}

impl ZfsCommand {
    /// Splits `command_line` on whitespace. Returns `None` when it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            prefix: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args<I, S>(&self, rest: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix
            .iter()
            .cloned()
            .chain(rest.into_iter().map(Into::into))
            .collect()
    }
}

impl Default for ZfsCommand {
    fn default() -> Self {
        Self {
            program: "zfs".to_string(),
            prefix: Vec::new(),
        }
    }
}

impl std::fmt::Display for ZfsCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.prefix {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Reads dataset names and numeric properties through `zfs`.
///
/// Uses scripting mode (`-H`, tab separated, no header) and exact values
/// (`-p`, plain bytes) so the output needs no unit parsing.
pub struct ZfsCollector<R: CommandRunner> {
    runner: R,
    command: ZfsCommand,
    property: String,
}

impl<R: CommandRunner> ZfsCollector<R> {
    /// Creates a collector reading `property` (e.g. `used`) for each dataset.
    pub fn new(runner: R, command: ZfsCommand, property: impl Into<String>) -> Self {
        Self {
            runner,
            command,
            property: property.into(),
        }
    }

    /// Returns a reference to the underlying command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs one `zfs` subcommand and returns its stdout on success.
    fn invoke(&mut self, args: Vec<String>) -> Result<String, CollectError> {
        let program = self.command.program().to_string();
        let subcommand = args.get(self.command.prefix.len()).cloned();
        let described = match subcommand {
            Some(sub) => format!("{} {}", self.command, sub),
            None => self.command.to_string(),
        };

        trace!("running {} {}", program, args.join(" "));
        let output = self
            .runner
            .run(&program, &args)
            .map_err(|source| CollectError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.signal == Some(SIGINT) {
            return Err(CollectError::Interrupted { command: described });
        }
        if !output.success {
            return Err(CollectError::Failed {
                command: described,
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

impl<R: CommandRunner> Inventory for ZfsCollector<R> {
    fn list_names(&mut self) -> Result<Vec<String>, CollectError> {
        let args = self.command.args(["list", "-H", "-o", "name"]);
        let stdout = self.invoke(args)?;
        let names: Vec<String> = stdout
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        debug!("inventory lists {} datasets", names.len());
        Ok(names)
    }
}

impl<R: CommandRunner> MetricSource for ZfsCollector<R> {
    fn collect(&mut self, names: &[String]) -> Result<Sample, CollectError> {
        let mut sample = Sample::new();
        if names.is_empty() {
            return Ok(sample);
        }

        let started = Instant::now();
        let args = self.command.args(
            ["get", "-H", "-p", "-o", "name,value", self.property.as_str()]
                .into_iter()
                .map(str::to_string)
                .chain(names.iter().cloned()),
        );
        let stdout = self.invoke(args)?;

        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        for line in stdout.lines() {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.split_once('\t') else {
                return Err(CollectError::Parse {
                    line: line.to_string(),
                    message: "expected '<name>\\t<value>'".to_string(),
                });
            };
            if !wanted.contains(name) {
                trace!("ignoring unrequested dataset {}", name);
                continue;
            }
            // "-" means the property does not apply to this dataset.
            if value == "-" {
                continue;
            }
            let value = value.parse::<u64>().map_err(|e| CollectError::Parse {
                line: line.to_string(),
                message: format!("{} is not a byte count: {}", self.property, e),
            })?;
            sample.insert(name.to_string(), value);
        }

        debug!(
            "collected {} of {} datasets in {:?}",
            sample.len(),
            names.len(),
            started.elapsed()
        );
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockRunner;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_line_parsing() {
        assert_eq!(ZfsCommand::parse("zfs"), Some(ZfsCommand::default()));
        let cmd = ZfsCommand::parse("  sudo -n   zfs ").unwrap();
        assert_eq!(cmd.program(), "sudo");
        assert_eq!(cmd.to_string(), "sudo -n zfs");
        assert_eq!(ZfsCommand::parse("   "), None);
    }

    #[test]
    fn collect_issues_one_batched_get() {
        let mut runner = MockRunner::new();
        runner.push_values(&[("tank/a", 100), ("tank/b", 200)]);
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        let sample = c.collect(&names(&["tank/a", "tank/b"])).unwrap();
        assert_eq!(sample.get("tank/a"), Some(&100));
        assert_eq!(sample.get("tank/b"), Some(&200));

        assert_eq!(c.runner().calls().len(), 1);
        assert_eq!(
            c.runner().calls()[0],
            vec![
                "zfs", "get", "-H", "-p", "-o", "name,value", "used", "tank/a", "tank/b"
            ]
        );
    }

    #[test]
    fn collect_prepends_wrapper_arguments() {
        let mut runner = MockRunner::new();
        runner.push_values(&[("tank", 1)]);
        let cmd = ZfsCommand::parse("sudo -n zfs").unwrap();
        let mut c = ZfsCollector::new(runner, cmd, "logicalused");

        c.collect(&names(&["tank"])).unwrap();
        assert_eq!(
            c.runner().calls()[0],
            vec![
                "sudo",
                "-n",
                "zfs",
                "get",
                "-H",
                "-p",
                "-o",
                "name,value",
                "logicalused",
                "tank"
            ]
        );
    }

    #[test]
    fn collect_skips_unreported_and_inapplicable() {
        let mut runner = MockRunner::new();
        runner.push_stdout("tank/a\t100\ntank/b\t-\nother\t5\n");
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        let sample = c
            .collect(&names(&["tank/a", "tank/b", "tank/gone"]))
            .unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample.get("tank/a"), Some(&100));
    }

    #[test]
    fn collect_with_no_names_does_not_run() {
        let mut c = ZfsCollector::new(MockRunner::new(), ZfsCommand::default(), "used");
        assert!(c.collect(&[]).unwrap().is_empty());
        assert!(c.runner().calls().is_empty());
    }

    #[test]
    fn collect_failure_carries_stderr() {
        let mut runner = MockRunner::new();
        runner.push_failure(1, "cannot open 'tank/x': dataset does not exist\n");
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        let err = c.collect(&names(&["tank/x"])).unwrap_err();
        match &err {
            CollectError::Failed {
                command, status, ..
            } => {
                assert_eq!(command, "zfs get");
                assert_eq!(*status, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "cannot open 'tank/x': dataset does not exist"
        );
    }

    #[test]
    fn child_killed_by_sigint_is_an_interrupt() {
        let mut runner = MockRunner::new();
        runner.push_signal(SIGINT).push_signal(SIGINT);
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        let err = c.collect(&names(&["tank"])).unwrap_err();
        assert!(
            matches!(err, CollectError::Interrupted { ref command } if command == "zfs get"),
            "{err:?}"
        );
        assert!(c.list_names().unwrap_err().is_interrupted());
    }

    #[test]
    fn child_killed_by_other_signal_is_a_failure() {
        let mut runner = MockRunner::new();
        runner.push_signal(9);
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        let err = c.collect(&names(&["tank"])).unwrap_err();
        assert!(matches!(err, CollectError::Failed { status: None, .. }));
        assert_eq!(err.to_string(), "'zfs get' was terminated by a signal");
    }

    #[test]
    fn collect_spawn_error() {
        let mut runner = MockRunner::new();
        runner.push_spawn_error(std::io::ErrorKind::NotFound);
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        let err = c.collect(&names(&["tank"])).unwrap_err();
        assert!(matches!(err, CollectError::Spawn { ref program, .. } if program == "zfs"));
    }

    #[test]
    fn collect_rejects_garbage() {
        let mut runner = MockRunner::new();
        runner.push_stdout("tank 100\n");
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");
        assert!(matches!(
            c.collect(&names(&["tank"])),
            Err(CollectError::Parse { .. })
        ));

        let mut runner = MockRunner::new();
        runner.push_stdout("tank\t1.5G\n");
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");
        assert!(matches!(
            c.collect(&names(&["tank"])),
            Err(CollectError::Parse { .. })
        ));
    }

    #[test]
    fn list_names() {
        let mut runner = MockRunner::new();
        runner.push_stdout("tank\ntank/home\n\ntank/var\n");
        let mut c = ZfsCollector::new(runner, ZfsCommand::default(), "used");

        assert_eq!(
            c.list_names().unwrap(),
            names(&["tank", "tank/home", "tank/var"])
        );
        assert_eq!(
            c.runner().calls()[0],
            vec!["zfs", "list", "-H", "-o", "name"]
        );
    }
}
