//! Expansion of dataset arguments into concrete dataset names.

use regex::Regex;
use tracing::debug;

use crate::collector::{CollectError, Inventory};

/// Error type for dataset name resolution.
#[derive(Debug)]
pub enum ResolveError {
    /// A pattern is not a valid regular expression.
    Pattern { pattern: String, source: regex::Error },
    /// The dataset inventory could not be listed.
    Inventory(CollectError),
    /// No dataset matched any pattern.
    NoMatch(Vec<String>),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Pattern { pattern, source } => {
                write!(f, "invalid pattern '{}': {}", pattern, source)
            }
            ResolveError::Inventory(e) => write!(f, "failed to list datasets: {}", e),
            ResolveError::NoMatch(patterns) => {
                write!(f, "no dataset matches {}", patterns.join(", "))
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Pattern { source, .. } => Some(source),
            ResolveError::Inventory(e) => Some(e),
            ResolveError::NoMatch(_) => None,
        }
    }
}

impl From<CollectError> for ResolveError {
    fn from(e: CollectError) -> Self {
        ResolveError::Inventory(e)
    }
}

/// Returns every listed dataset that matches at least one pattern.
///
/// Matching is a search, not a full match: `home` selects `tank/home/alice`.
/// Output keeps the inventory's order.
pub fn resolve_patterns<I: Inventory>(
    inventory: &mut I,
    patterns: &[String],
) -> Result<Vec<String>, ResolveError> {
    let regexes = patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| ResolveError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let all = inventory.list_names()?;
    let total = all.len();
    let matched: Vec<String> = all
        .into_iter()
        .filter(|name| regexes.iter().any(|re| re.is_match(name)))
        .collect();

    debug!(
        "{} of {} datasets match {} pattern(s)",
        matched.len(),
        total,
        patterns.len()
    );

    if matched.is_empty() {
        return Err(ResolveError::NoMatch(patterns.to_vec()));
    }
    Ok(matched)
}

/// Drops repeated names, keeping the first occurrence.
pub fn dedup_names(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}
