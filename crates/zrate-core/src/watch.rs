//! The sampling loop: collect, compare, report, sleep.
//!
//! Each tick runs to completion before the next one starts. The interval is
//! slept after the work, so slow collections shift later ticks instead of
//! overlapping them. A shared `running` flag is checked before every tick
//! and while sleeping; clearing it ends the loop cleanly. So does a `zfs`
//! child killed by Ctrl-C, or a reader closing the output pipe.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, trace};

use crate::collector::{CollectError, MetricSource};
use crate::config::WatchConfig;
use crate::error::Error;
use crate::report::{ReportStyle, render_lines};
use crate::sampler::{Report, Sampler};

/// Time source and sleeper for the loop.
pub trait Clock {
    /// Wall-clock time used for report timestamps.
    fn now(&self) -> DateTime<Local>;

    /// Blocks for `duration`, returning early once `running` is cleared.
    fn sleep(&mut self, duration: Duration, running: &AtomicBool);
}

/// Real clock that sleeps in short slices so shutdown stays responsive.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    slice: Duration,
}

impl SystemClock {
    pub fn new(slice: Duration) -> Self {
        Self { slice }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&mut self, duration: Duration, running: &AtomicBool) {
        let mut remaining = duration;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(self.slice);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Successful collections.
    pub ticks: u64,
    /// Ticks that produced output.
    pub reports: u64,
}

/// Drives a [`MetricSource`] through a [`Sampler`] and prints reports.
pub struct Watcher<S: MetricSource, C: Clock> {
    source: S,
    clock: C,
    names: Vec<String>,
    sampler: Sampler,
    style: ReportStyle,
    interval: Duration,
    count: Option<u64>,
    running: Arc<AtomicBool>,
}

impl<S: MetricSource, C: Clock> Watcher<S, C> {
    /// Creates a watcher for `names`.
    ///
    /// # Arguments
    /// * `source` - where samples come from
    /// * `clock` - time source and sleeper
    /// * `names` - datasets to query on every tick
    /// * `config` - interval, threshold, display options, report count
    /// * `running` - cleared by a signal handler to stop the loop
    pub fn new(
        source: S,
        clock: C,
        names: Vec<String>,
        config: &WatchConfig,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            clock,
            names,
            sampler: Sampler::new(config.threshold(), config.interval()),
            style: *config.style(),
            interval: config.interval(),
            count: config.count(),
            running,
        }
    }

    /// Returns a reference to the metric source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a reference to the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Collects one sample and compares it with the previous one.
    pub fn tick(&mut self) -> Result<Option<Report>, CollectError> {
        let sample = self.source.collect(&self.names)?;
        if !self.sampler.is_primed() {
            debug!("baseline sample taken");
        }
        Ok(self.sampler.observe(sample))
    }

    fn write_report<W: Write>(&self, out: &mut W, report: &Report) -> io::Result<()> {
        for line in render_lines(report, &self.style, self.clock.now()) {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }

    /// Runs until `running` is cleared, the report count is reached, or a
    /// collection fails.
    ///
    /// A collection failure is fatal unless it happened while shutting down
    /// or the child was interrupted. A closed output pipe also stops the loop
    /// without error.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        while self.is_running() {
            let started = Instant::now();
            let report = match self.tick() {
                Ok(report) => report,
                Err(e) if e.is_interrupted() || !self.is_running() => {
                    debug!("collection interrupted by shutdown: {}", e);
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            summary.ticks += 1;

            match report {
                Some(report) => {
                    debug!(
                        "tick {}: {} dataset(s) above threshold, total {} bytes",
                        summary.ticks,
                        report.entries.len(),
                        report.total_delta
                    );
                    match self.write_report(out, &report) {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                            debug!("output closed, stopping");
                            break;
                        }
                        Err(e) => return Err(e.into()),
                    }
                    summary.reports += 1;

                    if self.count.is_some_and(|n| summary.reports >= n) {
                        debug!("report count {} reached", summary.reports);
                        break;
                    }
                }
                None => trace!("tick {}: nothing above threshold", summary.ticks),
            }

            trace!("tick {} took {:?}", summary.ticks, started.elapsed());
            self.clock.sleep(self.interval, &self.running);
        }

        Ok(summary)
    }
}
