//! Size and rate literal parsing.
//!
//! Supports SI prefixes (`k`, `M`, `G`, `T`, `P`; base 1000) and binary
//! prefixes (`K`/`Ki`, `Mi`, `Gi`, `Ti`, `Pi`; base 1024), followed by an
//! optional byte/bit indicator and an optional per-second suffix:
//!
//! | Input      | Multiplier        |
//! |------------|-------------------|
//! | `Ki`, `K`  | 1024              |
//! | `M`        | 1 000 000         |
//! | `MiB`      | 1 048 576         |
//! | `Mb`       | 125 000           |
//! | `Bps`      | 1                 |
//! | `b`        | 0.125             |
//!
//! Rates and sizes share one table; a `ps` suffix never changes the
//! multiplier.

use std::sync::LazyLock;

use regex::Regex;

/// `<prefix>?[Bb][Pp]?[Ss]?`
static UNIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<prefix>[kKMGTP]i?)?(?<kind>[Bb])[Pp]?[Ss]?$").expect("valid unit pattern")
});

/// `<number><whitespace>?<unit>`
static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?<value>[0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*(?<unit>\S+)$")
        .expect("valid quantity pattern")
});

/// Error type for unit and literal parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// Token is neither a known prefix nor a byte/bit unit.
    InvalidUnit(String),
    /// Literal is not a non-negative number with an optional unit.
    InvalidLiteral(String),
}

impl std::fmt::Display for UnitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitError::InvalidUnit(token) => write!(f, "invalid unit '{}'", token),
            UnitError::InvalidLiteral(input) => write!(
                f,
                "invalid value '{}': expected a non-negative number with an optional unit \
                 (e.g. 500, 1.5M, 10MiB, 100Mbps)",
                input
            ),
        }
    }
}

impl std::error::Error for UnitError {}

/// Multiplier of a bare prefix symbol. `K` is binary, like `Ki`.
fn prefix_multiplier(prefix: &str) -> Option<f64> {
    let multiplier = match prefix {
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "K" | "Ki" => 1024f64,
        "Mi" => 1024f64.powi(2),
        "Gi" => 1024f64.powi(3),
        "Ti" => 1024f64.powi(4),
        "Pi" => 1024f64.powi(5),
        _ => return None,
    };
    Some(multiplier)
}

/// Resolves a unit token into a byte multiplier.
///
/// A lowercase `b` means bits and divides the multiplier by 8, whatever the
/// case of the prefix.
pub fn parse_unit(token: &str) -> Result<f64, UnitError> {
    if let Some(multiplier) = prefix_multiplier(token) {
        return Ok(multiplier);
    }

    let invalid = || UnitError::InvalidUnit(token.to_string());
    let caps = UNIT_PATTERN.captures(token).ok_or_else(invalid)?;

    let mut multiplier = match caps.name("prefix") {
        Some(prefix) => prefix_multiplier(prefix.as_str()).ok_or_else(invalid)?,
        None => 1.0,
    };
    if &caps["kind"] == "b" {
        multiplier /= 8.0;
    }
    Ok(multiplier)
}

/// A parsed size or rate literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    /// A bare number, already in bytes.
    Plain(f64),
    /// A number followed by a unit token.
    Scaled { value: f64, multiplier: f64 },
}

impl Quantity {
    /// Value in bytes (or bytes per second).
    pub fn bytes(self) -> f64 {
        match self {
            Quantity::Plain(value) => value,
            Quantity::Scaled { value, multiplier } => value * multiplier,
        }
    }
}

/// Parses a literal such as `"0"`, `"1.5e6"`, `"10M"` or `"100 Mbps"`.
///
/// A plain number is tried first; only when that fails is the input split
/// into number and unit.
pub fn parse_quantity(input: &str) -> Result<Quantity, UnitError> {
    let input = input.trim();

    if let Ok(value) = input.parse::<f64>() {
        return if value.is_finite() && value >= 0.0 {
            Ok(Quantity::Plain(value))
        } else {
            Err(UnitError::InvalidLiteral(input.to_string()))
        };
    }

    let caps = QUANTITY_PATTERN
        .captures(input)
        .ok_or_else(|| UnitError::InvalidLiteral(input.to_string()))?;
    let value = caps["value"]
        .parse::<f64>()
        .map_err(|_| UnitError::InvalidLiteral(input.to_string()))?;
    let multiplier = parse_unit(&caps["unit"])?;
    if !(value * multiplier).is_finite() {
        return Err(UnitError::InvalidLiteral(input.to_string()));
    }

    Ok(Quantity::Scaled { value, multiplier })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn k_and_ki_are_both_binary() {
        assert_eq!(parse_unit("Ki").unwrap(), 1024.0);
        assert_eq!(parse_unit("K").unwrap(), 1024.0);
        assert_eq!(parse_unit("k").unwrap(), 1000.0);
    }

    #[test]
    fn bare_prefixes() {
        assert_eq!(parse_unit("M").unwrap(), 1e6);
        assert_eq!(parse_unit("G").unwrap(), 1e9);
        assert_eq!(parse_unit("T").unwrap(), 1e12);
        assert_eq!(parse_unit("P").unwrap(), 1e15);
        assert_eq!(parse_unit("Mi").unwrap(), 1_048_576.0);
        assert_eq!(parse_unit("Gi").unwrap(), 1_073_741_824.0);
        assert_eq!(parse_unit("Pi").unwrap(), 1024f64.powi(5));
    }

    #[test]
    fn lowercase_b_means_bits() {
        assert!(close(parse_unit("Mb").unwrap(), 1e6 / 8.0));
        assert!(close(parse_unit("kb").unwrap(), 125.0));
        assert!(close(parse_unit("Kib").unwrap(), 128.0));
        assert!(close(parse_unit("b").unwrap(), 0.125));
    }

    #[test]
    fn byte_units_with_and_without_rate_suffix() {
        assert_eq!(parse_unit("B").unwrap(), 1.0);
        assert_eq!(parse_unit("MiB").unwrap(), 1_048_576.0);
        assert_eq!(parse_unit("MiBps").unwrap(), 1_048_576.0);
        assert_eq!(parse_unit("GBPs").unwrap(), 1e9);
        assert_eq!(parse_unit("Bps").unwrap(), 1.0);
        assert!(close(parse_unit("Mbps").unwrap(), 125_000.0));
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(
            parse_unit("bogus"),
            Err(UnitError::InvalidUnit("bogus".to_string()))
        );
        assert!(parse_unit("").is_err());
        assert!(parse_unit("ki").is_err());
        assert!(parse_unit("kiB").is_err());
        assert!(parse_unit("m").is_err());
        assert!(parse_unit("MiB/s").is_err());
        assert!(parse_unit("XB").is_err());
    }

    #[test]
    fn quantity_plain_number_wins() {
        assert_eq!(parse_quantity("0").unwrap(), Quantity::Plain(0.0));
        assert_eq!(parse_quantity(" 1500 ").unwrap(), Quantity::Plain(1500.0));
        assert_eq!(parse_quantity("1.5e6").unwrap(), Quantity::Plain(1.5e6));
    }

    #[test]
    fn quantity_with_unit() {
        let q = parse_quantity("10M").unwrap();
        assert_eq!(
            q,
            Quantity::Scaled {
                value: 10.0,
                multiplier: 1e6
            }
        );
        assert_eq!(q.bytes(), 1e7);

        assert_eq!(parse_quantity("1.5 KiB").unwrap().bytes(), 1536.0);
        assert!(close(parse_quantity("8Mbps").unwrap().bytes(), 1e6));
        assert_eq!(parse_quantity(".5K").unwrap().bytes(), 512.0);
    }

    #[test]
    fn quantity_rejects_garbage() {
        assert!(matches!(
            parse_quantity("fast"),
            Err(UnitError::InvalidLiteral(_))
        ));
        assert!(matches!(
            parse_quantity("-5"),
            Err(UnitError::InvalidLiteral(_))
        ));
        assert!(matches!(
            parse_quantity("inf"),
            Err(UnitError::InvalidLiteral(_))
        ));
        assert!(matches!(
            parse_quantity("NaN"),
            Err(UnitError::InvalidLiteral(_))
        ));
        assert!(matches!(parse_quantity(""), Err(UnitError::InvalidLiteral(_))));
        let overflow = format!("{}P", "9".repeat(400));
        assert!(matches!(
            parse_quantity(&overflow),
            Err(UnitError::InvalidLiteral(_))
        ));
        assert_eq!(
            parse_quantity("10 bogus"),
            Err(UnitError::InvalidUnit("bogus".to_string()))
        );
    }
}
