//! Collection error type.

use std::io;

/// Error type for inventory and metric collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// The command could not be started.
    Spawn { program: String, source: io::Error },
    /// The command ran and reported failure. `stderr` is kept verbatim.
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    /// The command succeeded but printed a line we cannot interpret.
    Parse { line: String, message: String },
    /// The command was killed by SIGINT, i.e. the user pressed Ctrl-C.
    Interrupted { command: String },
}

impl CollectError {
    /// `true` when the failure only reflects a user interrupt.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, CollectError::Interrupted { .. })
    }
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Spawn { program, source } => {
                write!(f, "failed to run '{}': {}", program, source)
            }
            CollectError::Failed {
                command,
                status,
                stderr,
            } => {
                let stderr = stderr.trim_end();
                if !stderr.is_empty() {
                    write!(f, "{}", stderr)
                } else if let Some(code) = status {
                    write!(f, "'{}' exited with status {}", command, code)
                } else {
                    write!(f, "'{}' was terminated by a signal", command)
                }
            }
            CollectError::Parse { line, message } => {
                write!(f, "unexpected output line '{}': {}", line, message)
            }
            CollectError::Interrupted { command } => write!(f, "'{}' was interrupted", command),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_shows_stderr_verbatim() {
        let err = CollectError::Failed {
            command: "zfs get".to_string(),
            status: Some(1),
            stderr: "cannot open 'tank/gone': dataset does not exist\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot open 'tank/gone': dataset does not exist"
        );
    }

    #[test]
    fn failed_without_stderr_mentions_status() {
        let err = CollectError::Failed {
            command: "zfs list".to_string(),
            status: Some(2),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "'zfs list' exited with status 2");

        let err = CollectError::Failed {
            command: "zfs list".to_string(),
            status: None,
            stderr: "  \n".to_string(),
        };
        assert_eq!(err.to_string(), "'zfs list' was terminated by a signal");
        assert!(!err.is_interrupted());
    }

    #[test]
    fn interrupted() {
        let err = CollectError::Interrupted {
            command: "zfs get".to_string(),
        };
        assert!(err.is_interrupted());
        assert_eq!(err.to_string(), "'zfs get' was interrupted");
    }
}
