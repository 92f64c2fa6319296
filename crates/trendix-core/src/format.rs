//! Human-readable number and age formatting for dashboard output.

use chrono::{DateTime, Utc};

/// Formats a count as `1.2M`, `3.4K`, or the plain integer.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_compact(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Like [`format_compact`] but always signed for non-negative values.
#[must_use]
pub fn format_change(n: i64) -> String {
    let sign = if n >= 0 { "+" } else { "" };
    format!("{sign}{}", format_compact(n))
}

/// Coarse age of `published` relative to `now`: minutes under an hour, hours
/// under a day, days under a week, weeks after that.
#[must_use]
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - published).num_seconds();
    if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else if seconds < 604_800 {
        format!("{}d ago", seconds / 86_400)
    } else {
        format!("{}w ago", seconds / 604_800)
    }
}
