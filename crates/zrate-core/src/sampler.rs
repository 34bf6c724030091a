//! Delta and rate computation between consecutive samples.
//!
//! The first sample only primes the state. Every later sample is compared
//! against the one before it; datasets that grew by more than the threshold
//! end up in a [`Report`].

use std::time::Duration;

use crate::collector::Sample;

/// Growth of one dataset between two samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Growth {
    pub name: String,
    /// Bytes added since the previous sample.
    pub delta: u64,
    /// `delta` divided by the interval, in bytes per second.
    pub rate: f64,
}

/// Datasets that grew past the threshold during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Sorted by dataset name. Never empty.
    pub entries: Vec<Growth>,
    pub total_delta: u64,
    pub total_rate: f64,
}

impl Report {
    /// Share of the total rate contributed by `growth`, in percent.
    pub fn rate_share(&self, growth: &Growth) -> f64 {
        share(growth.rate, self.total_rate)
    }

    /// Share of the total delta contributed by `growth`, in percent.
    pub fn delta_share(&self, growth: &Growth) -> f64 {
        share(growth.delta as f64, self.total_delta as f64)
    }
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}

/// Compares two samples and keeps datasets with `delta > threshold`.
///
/// Datasets missing from either sample are skipped, as are datasets that
/// shrank or did not change. Returns `None` when nothing qualifies.
pub fn compute_report(
    previous: &Sample,
    current: &Sample,
    threshold: f64,
    interval: Duration,
) -> Option<Report> {
    let secs = interval.as_secs_f64();

    let entries: Vec<Growth> = current
        .iter()
        .filter_map(|(name, &now)| {
            let before = *previous.get(name)?;
            let delta = now.checked_sub(before).filter(|&d| d > 0)?;
            ((delta as f64) > threshold).then(|| Growth {
                name: name.clone(),
                delta,
                rate: delta as f64 / secs,
            })
        })
        .collect();

    if entries.is_empty() {
        return None;
    }

    let total_delta = entries
        .iter()
        .fold(0u64, |acc, g| acc.saturating_add(g.delta));
    let total_rate = entries.iter().map(|g| g.rate).sum();
    Some(Report {
        entries,
        total_delta,
        total_rate,
    })
}

/// Holds the previous sample and turns each new one into an optional report.
#[derive(Debug, Clone)]
pub struct Sampler {
    threshold: f64,
    interval: Duration,
    previous: Option<Sample>,
}

impl Sampler {
    /// Creates a sampler with no previous sample.
    ///
    /// # Arguments
    /// * `threshold` - minimum growth per tick, in bytes
    /// * `interval` - time between samples, used to derive rates
    pub fn new(threshold: f64, interval: Duration) -> Self {
        Self {
            threshold,
            interval,
            previous: None,
        }
    }

    /// `true` once a first sample has been observed.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Feeds the next sample. The new sample always replaces the previous one.
    pub fn observe(&mut self, current: Sample) -> Option<Report> {
        let report = self
            .previous
            .as_ref()
            .and_then(|prev| compute_report(prev, &current, self.threshold, self.interval));
        self.previous = Some(current);
        report
    }
}
