//! Text rendering of growth reports.
//!
//! One line per dataset plus a total line with an empty name column:
//!
//! ```text
//! tank/a  1.50 KiB/s   33.33%   33.33%   7.50 KiB
//! tank/b  3.00 KiB/s   66.67%   66.67%  15.00 KiB
//!         4.50 KiB/s  100.00%  100.00%  22.50 KiB
//! ```

use chrono::{DateTime, Local};

use crate::fmt::{UnitSystem, format_bytes, format_bytes_rate, format_percent};
use crate::sampler::Report;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const COLUMN_GAP: &str = "  ";

/// Display options for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportStyle {
    pub units: UnitSystem,
    /// Show each dataset's share of the total rate and delta.
    pub percent: bool,
    /// Prefix every line with the tick's wall-clock time.
    pub timestamps: bool,
}

struct Row {
    name: String,
    rate: String,
    shares: Option<(String, String)>,
    delta: String,
}

/// Renders `report` as aligned text lines taken at time `at`.
pub fn render_lines(report: &Report, style: &ReportStyle, at: DateTime<Local>) -> Vec<String> {
    let mut rows: Vec<Row> = report
        .entries
        .iter()
        .map(|g| Row {
            name: g.name.clone(),
            rate: format_bytes_rate(g.rate, style.units),
            shares: style.percent.then(|| {
                (
                    format_percent(report.rate_share(g)),
                    format_percent(report.delta_share(g)),
                )
            }),
            delta: format_bytes(g.delta as f64, style.units),
        })
        .collect();

    rows.push(Row {
        name: String::new(),
        rate: format_bytes_rate(report.total_rate, style.units),
        shares: style
            .percent
            .then(|| (format_percent(100.0), format_percent(100.0))),
        delta: format_bytes(report.total_delta as f64, style.units),
    });

    let name_w = column_width(&rows, |r| &r.name);
    let rate_w = column_width(&rows, |r| &r.rate);
    let delta_w = column_width(&rows, |r| &r.delta);
    let share_w = rows
        .iter()
        .filter_map(|r| r.shares.as_ref())
        .map(|(a, b)| a.len().max(b.len()))
        .max()
        .unwrap_or(0);

    let stamp = style
        .timestamps
        .then(|| at.format(TIMESTAMP_FORMAT).to_string());

    rows.iter()
        .map(|row| {
            let mut cols: Vec<String> = Vec::with_capacity(6);
            if let Some(stamp) = &stamp {
                cols.push(stamp.clone());
            }
            cols.push(format!("{:<name_w$}", row.name));
            cols.push(format!("{:>rate_w$}", row.rate));
            if let Some((rate_pct, delta_pct)) = &row.shares {
                cols.push(format!("{:>share_w$}", rate_pct));
                cols.push(format!("{:>share_w$}", delta_pct));
            }
            cols.push(format!("{:>delta_w$}", row.delta));
            cols.join(COLUMN_GAP)
        })
        .collect()
}

fn column_width(rows: &[Row], field: impl Fn(&Row) -> &String) -> usize {
    rows.iter().map(|r| field(r).len()).max().unwrap_or(0)
}
