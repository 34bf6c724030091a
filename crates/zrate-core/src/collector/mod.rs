//! Metric collection from the external `zfs` tool.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ZfsCollector                 │
//! │  Inventory:    zfs list -H -o name           │
//! │  MetricSource: zfs get -H -p -o name,value   │
//! └───────────────────────┬──────────────────────┘
//!                         │
//!                 ┌───────▼───────┐
//!                 │ CommandRunner │ (trait)
//!                 └───────┬───────┘
//!                         │
//!              ┌──────────┴──────────┐
//!       ┌──────▼───────┐      ┌──────▼──────┐
//!       │ SystemRunner │      │ MockRunner  │
//!       │ (processes)  │      │ (scripted)  │
//!       └──────────────┘      └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use zrate_core::collector::{MetricSource, MockRunner, ZfsCollector, ZfsCommand};
//!
//! let mut runner = MockRunner::new();
//! runner.push_values(&[("tank/home", 4096)]);
//! let mut collector = ZfsCollector::new(runner, ZfsCommand::default(), "used");
//! let sample = collector.collect(&["tank/home".to_string()]).unwrap();
//! assert_eq!(sample["tank/home"], 4096);
//! ```

use std::collections::BTreeMap;

mod error;
pub mod mock;
pub mod traits;
mod zfs;

pub use error::CollectError;
pub use mock::MockRunner;
pub use traits::{CommandOutput, CommandRunner, Inventory, MetricSource, SystemRunner};
pub use zfs::{ZfsCollector, ZfsCommand};

/// One reading of the watched property: dataset name to byte count.
///
/// Ordered by name, which fixes the order of report rows.
pub type Sample = BTreeMap<String, u64>;
