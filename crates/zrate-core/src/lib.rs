//! zrate-core — library behind the `zrate` ZFS growth watcher.
//!
//! Provides:
//! - `units` — size/rate literal parsing with SI and binary suffixes
//! - `fmt` — human-readable byte and rate formatting
//! - `collector` — dataset inventory and property sampling through `zfs`
//! - `resolver` — regular-expression expansion of dataset names
//! - `sampler` — delta, rate and threshold computation between samples
//! - `report` — text rendering of growth reports
//! - `watch` — the collect/report/sleep loop
//! - `config` — validated run configuration

pub mod collector;
pub mod config;
pub mod error;
pub mod fmt;
pub mod report;
pub mod resolver;
pub mod sampler;
pub mod units;
pub mod watch;

pub use error::Error;
