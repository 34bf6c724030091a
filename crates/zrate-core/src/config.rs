//! Watch configuration and its validation.

use std::time::Duration;

use crate::collector::ZfsCommand;
use crate::fmt::UnitSystem;
use crate::report::ReportStyle;
use crate::units::{UnitError, parse_quantity};

/// Default polling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;
/// Default growth threshold: report any growth.
pub const DEFAULT_THRESHOLD: &str = "0";
/// Default watched ZFS property.
pub const DEFAULT_PROPERTY: &str = "used";
/// Default command used to reach `zfs`.
pub const DEFAULT_ZFS_COMMAND: &str = "zfs";

/// Error type for invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Threshold literal or unit could not be parsed.
    Threshold(UnitError),
    /// Interval must be at least one second.
    ZeroInterval,
    /// The zfs command line is blank.
    EmptyCommand,
    /// The property name is blank or contains whitespace.
    InvalidProperty(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Threshold(e) => write!(f, "invalid threshold: {}", e),
            ConfigError::ZeroInterval => write!(f, "interval must be at least 1 second"),
            ConfigError::EmptyCommand => write!(f, "zfs command must not be empty"),
            ConfigError::InvalidProperty(p) => write!(f, "invalid property name '{}'", p),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Threshold(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnitError> for ConfigError {
    fn from(e: UnitError) -> Self {
        ConfigError::Threshold(e)
    }
}

/// Everything the watch loop needs besides the dataset names.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    interval: Duration,
    threshold: f64,
    style: ReportStyle,
    property: String,
    zfs_command: ZfsCommand,
    count: Option<u64>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            threshold: 0.0,
            style: ReportStyle::default(),
            property: DEFAULT_PROPERTY.to_string(),
            zfs_command: ZfsCommand::default(),
            count: None,
        }
    }
}

impl WatchConfig {
    /// Creates a configuration from an interval and a threshold literal.
    ///
    /// # Arguments
    /// * `interval_secs` - seconds between samples, at least 1
    /// * `threshold` - minimum growth, e.g. `"0"`, `"10M"`, `"1.5GiB"`
    pub fn new(interval_secs: u64, threshold: &str) -> Result<Self, ConfigError> {
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let threshold = parse_quantity(threshold)?.bytes();
        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            threshold,
            ..Self::default()
        })
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.style.units = units;
        self
    }

    pub fn with_percent(mut self, percent: bool) -> Self {
        self.style.percent = percent;
        self
    }

    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.style.timestamps = timestamps;
        self
    }

    /// Stop after `count` reports. `None` runs until interrupted.
    pub fn with_count(mut self, count: Option<u64>) -> Self {
        self.count = count;
        self
    }

    pub fn with_property(mut self, property: &str) -> Result<Self, ConfigError> {
        let property = property.trim();
        if property.is_empty() || property.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidProperty(property.to_string()));
        }
        self.property = property.to_string();
        Ok(self)
    }

    /// Sets the command line used to run `zfs`, e.g. `"sudo -n zfs"`.
    pub fn with_zfs_command(mut self, command_line: &str) -> Result<Self, ConfigError> {
        self.zfs_command = ZfsCommand::parse(command_line).ok_or(ConfigError::EmptyCommand)?;
        Ok(self)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Threshold in bytes.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn style(&self) -> &ReportStyle {
        &self.style
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn zfs_command(&self) -> &ZfsCommand {
        &self.zfs_command
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = WatchConfig::new(DEFAULT_INTERVAL_SECS, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(c, WatchConfig::default());
        assert_eq!(c.interval(), Duration::from_secs(5));
        assert_eq!(c.threshold(), 0.0);
        assert_eq!(c.property(), "used");
        assert_eq!(c.zfs_command().to_string(), "zfs");
        assert_eq!(c.style().units, UnitSystem::Binary);
        assert!(!c.style().percent);
        assert_eq!(c.count(), None);
    }

    #[test]
    fn threshold_with_unit() {
        let c = WatchConfig::new(1, "10MiB").unwrap();
        assert_eq!(c.threshold(), 10.0 * 1024.0 * 1024.0);
        let c = WatchConfig::new(1, "8Mbps").unwrap();
        assert!((c.threshold() - 1e6).abs() < 1e-6);
    }

    #[test]
    fn invalid_threshold() {
        let err = WatchConfig::new(5, "10 parsecs").unwrap_err();
        assert_eq!(
            err,
            ConfigError::Threshold(UnitError::InvalidUnit("parsecs".to_string()))
        );
        assert_eq!(err.to_string(), "invalid threshold: invalid unit 'parsecs'");
    }

    #[test]
    fn zero_interval() {
        assert_eq!(WatchConfig::new(0, "0"), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn builders() {
        let c = WatchConfig::new(2, "0")
            .unwrap()
            .with_units(UnitSystem::Si)
            .with_percent(true)
            .with_timestamps(true)
            .with_count(Some(3))
            .with_property("logicalused")
            .unwrap()
            .with_zfs_command("sudo -n zfs")
            .unwrap();
        assert_eq!(c.style().units, UnitSystem::Si);
        assert!(c.style().percent);
        assert!(c.style().timestamps);
        assert_eq!(c.count(), Some(3));
        assert_eq!(c.property(), "logicalused");
        assert_eq!(c.zfs_command().program(), "sudo");
    }

    #[test]
    fn rejects_blank_command_and_property() {
        let c = WatchConfig::default();
        assert_eq!(
            c.clone().with_zfs_command("  "),
            Err(ConfigError::EmptyCommand)
        );
        assert!(matches!(
            c.clone().with_property(""),
            Err(ConfigError::InvalidProperty(_))
        ));
        assert!(matches!(
            c.with_property("used avail"),
            Err(ConfigError::InvalidProperty(_))
        ));
    }
}
