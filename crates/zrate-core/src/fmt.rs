//! Human-readable byte and rate formatting.

/// Display unit family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    /// Powers of 1024: `KiB`, `MiB`, ...
    #[default]
    Binary,
    /// Powers of 1000: `kB`, `MB`, ...
    Si,
}

impl UnitSystem {
    fn base(self) -> f64 {
        match self {
            UnitSystem::Binary => 1024.0,
            UnitSystem::Si => 1000.0,
        }
    }

    fn symbols(self) -> &'static [&'static str; 6] {
        match self {
            UnitSystem::Binary => &["B", "KiB", "MiB", "GiB", "TiB", "PiB"],
            UnitSystem::Si => &["B", "kB", "MB", "GB", "TB", "PB"],
        }
    }
}

/// Format a byte count with two decimals and the largest fitting unit.
///
/// A value is promoted only while it is strictly greater than the base, so
/// exactly 1024 (binary) stays `"1024.00 B"`.
///
/// `bytes` must be finite and non-negative.
pub fn format_bytes(bytes: f64, units: UnitSystem) -> String {
    debug_assert!(bytes.is_finite() && bytes >= 0.0, "bytes = {}", bytes);

    let base = units.base();
    let symbols = units.symbols();
    let mut value = bytes;
    let mut idx = 0;
    while value > base && idx + 1 < symbols.len() {
        value /= base;
        idx += 1;
    }
    format!("{:.2} {}", value, symbols[idx])
}

/// Format a bytes-per-second rate: `"1.50 MiB/s"`.
pub fn format_bytes_rate(rate: f64, units: UnitSystem) -> String {
    format!("{}/s", format_bytes(rate, units))
}

/// Format a percentage with two decimals: `"25.00%"`.
pub fn format_percent(pct: f64) -> String {
    format!("{:.2}%", pct)
}
