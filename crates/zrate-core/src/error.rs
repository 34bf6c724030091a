//! Top-level error type.

use std::io;

use crate::collector::CollectError;
use crate::config::ConfigError;
use crate::resolver::ResolveError;

/// Any failure that ends a run.
#[derive(Debug)]
pub enum Error {
    /// Invalid configuration, detected before the loop starts.
    Config(ConfigError),
    /// Dataset patterns could not be resolved, detected before the loop starts.
    Resolve(ResolveError),
    /// The metric query failed during the loop.
    Collect(CollectError),
    /// The report could not be written.
    Output(io::Error),
}

impl Error {
    /// `true` when the run ended because the user pressed Ctrl-C while
    /// `zfs` was running; such a run should exit quietly.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Error::Collect(e) | Error::Resolve(ResolveError::Inventory(e)) => e.is_interrupted(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "{}", e),
            Error::Resolve(e) => write!(f, "{}", e),
            Error::Collect(e) => write!(f, "{}", e),
            Error::Output(e) => write!(f, "failed to write report: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Resolve(e) => Some(e),
            Error::Collect(e) => Some(e),
            Error::Output(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        Error::Resolve(e)
    }
}

impl From<CollectError> for Error {
    fn from(e: CollectError) -> Self {
        Error::Collect(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Output(e)
    }
}
