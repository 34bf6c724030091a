//! zrate - ZFS dataset growth watcher.
//!
//! Polls a numeric ZFS property (default `used`) for a set of datasets and
//! prints those that grew by more than a threshold since the previous poll.
//!
//! Usage:
//!   zrate tank/home tank/var          # poll every 5 seconds
//!   zrate -i 60 -T 100M tank          # report only growth above 100 MB per minute
//!   zrate -r -p '^tank/vm/'           # every dataset under tank/vm, with shares
//!   zrate -o logicalused --si tank    # logical usage in SI units

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use zrate_core::Error;
use zrate_core::collector::{SystemRunner, ZfsCollector};
use zrate_core::config::{
    ConfigError, DEFAULT_INTERVAL_SECS, DEFAULT_PROPERTY, DEFAULT_THRESHOLD, DEFAULT_ZFS_COMMAND,
    WatchConfig,
};
use zrate_core::fmt::{UnitSystem, format_bytes};
use zrate_core::resolver::{dedup_names, resolve_patterns};
use zrate_core::watch::{SystemClock, Watcher};

/// Reports ZFS datasets whose usage grows faster than a threshold.
#[derive(Parser, Debug)]
#[command(name = "zrate", about = "ZFS dataset growth watcher", version)]
struct Args {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warnings only.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// Treat DATASETS as regular expressions matched against `zfs list`.
    #[arg(short, long)]
    regex: bool,

    /// Display SI units (kB, MB, ...) instead of binary units (KiB, MiB, ...).
    #[arg(long)]
    si: bool,

    /// Prefix every report line with the time of the poll.
    #[arg(short, long)]
    timestamps: bool,

    /// Show each dataset's share of the total rate and growth.
    #[arg(short, long)]
    percent: bool,

    /// Poll interval in seconds.
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    /// Minimum growth per poll to report (e.g. 0, 512K, 10MiB, 100Mbps).
    #[arg(short = 'T', long, default_value = DEFAULT_THRESHOLD)]
    threshold: String,

    /// Numeric ZFS property to watch (used, logicalused, referenced, written, ...).
    #[arg(short = 'o', long, default_value = DEFAULT_PROPERTY)]
    property: String,

    /// Command used to run zfs, e.g. "sudo -n zfs".
    #[arg(long, env = "ZRATE_ZFS", default_value = DEFAULT_ZFS_COMMAND)]
    zfs_command: String,

    /// Exit after this many reports.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    count: Option<u64>,

    /// Datasets to watch (or patterns with --regex).
    #[arg(value_name = "DATASETS", required = true, num_args = 1..)]
    datasets: Vec<String>,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is WARN. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["zrate", "zrate_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<WatchConfig, ConfigError> {
    let units = if args.si {
        UnitSystem::Si
    } else {
        UnitSystem::Binary
    };

    Ok(WatchConfig::new(args.interval, &args.threshold)?
        .with_units(units)
        .with_percent(args.percent)
        .with_timestamps(args.timestamps)
        .with_count(args.count)
        .with_property(&args.property)?
        .with_zfs_command(&args.zfs_command)?)
}

fn run(args: &Args) -> Result<(), Error> {
    let config = build_config(args)?;

    info!("zrate {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, threshold={}, property={}, zfs={}",
        config.interval().as_secs(),
        format_bytes(config.threshold(), config.style().units),
        config.property(),
        config.zfs_command()
    );

    let mut collector = ZfsCollector::new(
        SystemRunner::new(),
        config.zfs_command().clone(),
        config.property(),
    );

    let names = if args.regex {
        resolve_patterns(&mut collector, &args.datasets)?
    } else {
        dedup_names(&args.datasets)
    };
    info!("Watching {} dataset(s)", names.len());
    debug!("Datasets: {}", names.join(", "));

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut watcher = Watcher::new(
        collector,
        SystemClock::default(),
        names,
        &config,
        running,
    );
    let stdout = io::stdout();
    let summary = watcher.run(&mut stdout.lock())?;

    info!(
        "Stopped after {} polls, {} reports",
        summary.ticks, summary.reports
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_interrupted() => {
            info!("Interrupted: {}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("zrate: {}", e);
            ExitCode::FAILURE
        }
    }
}
