//! View/like history normalization.
//!
//! Turns a raw snapshot feed into a delta-scaled series: every value is
//! re-based against the series minimum so charts emphasize relative change
//! rather than absolute magnitude.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Default chart label: month/day of the snapshot in UTC.
pub const DEFAULT_LABEL_FORMAT: &str = "%m/%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Views,
    Likes,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Views => write!(f, "views"),
            Metric::Likes => write!(f, "likes"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "views" => Ok(Metric::Views),
            "likes" => Ok(Metric::Likes),
            other => Err(format!("unknown metric '{other}' (expected views or likes)")),
        }
    }
}

/// One daily snapshot from the backend history feed.
///
/// Decoding is lenient: a `null`, missing, or non-numeric count reads as 0 so
/// the snapshot keeps its point on every chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySample {
    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub snapshot_date: String,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub view_count: i64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub like_count: i64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub comment_count: i64,
}

impl HistorySample {
    #[must_use]
    pub fn value(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Views => self.view_count,
            Metric::Likes => self.like_count,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_snapshot_date(&self.snapshot_date)
    }
}

/// Parses a snapshot date as RFC 3339, a naive date-time, or a plain date.
/// Naive values are taken as UTC.
#[must_use]
pub fn parse_snapshot_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub raw_value: i64,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSeries {
    pub points: Vec<SeriesPoint>,
    pub min: i64,
    pub max_delta: i64,
    pub net_change: i64,
    pub is_constant: bool,
}

impl NormalizedSeries {
    /// The "no data" series.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            min: 0,
            max_delta: 0,
            net_change: 0,
            is_constant: true,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bar height in `[0, 1]` for a point of this series.
    ///
    /// A flat series renders as uniform full bars, so the fraction is 1.0
    /// whenever `max_delta` is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn height_fraction(&self, point: &SeriesPoint) -> f64 {
        if self.max_delta > 0 {
            point.delta as f64 / self.max_delta as f64
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn height_fractions(&self) -> Vec<f64> {
        self.points.iter().map(|p| self.height_fraction(p)).collect()
    }
}

/// Normalizes `samples` for `metric`, labelling points with
/// [`DEFAULT_LABEL_FORMAT`].
#[must_use]
pub fn normalize(samples: &[HistorySample], metric: Metric) -> NormalizedSeries {
    normalize_with_labels(samples, metric, |ts| {
        ts.format(DEFAULT_LABEL_FORMAT).to_string()
    })
}

/// Normalizes `samples` for `metric` with a caller-supplied label function.
///
/// Samples are ordered oldest-first by parsed timestamp before anything else
/// is computed; samples whose date does not parse keep their relative order
/// after the dated ones and are labelled with the raw date string.
#[must_use]
pub fn normalize_with_labels<F>(
    samples: &[HistorySample],
    metric: Metric,
    labeler: F,
) -> NormalizedSeries
where
    F: Fn(DateTime<Utc>) -> String,
{
    let mut ordered: Vec<(Option<DateTime<Utc>>, &HistorySample)> =
        samples.iter().map(|s| (s.timestamp(), s)).collect();
    ordered.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let values: Vec<i64> = ordered.iter().map(|(_, s)| s.value(metric)).collect();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return NormalizedSeries::empty();
    };

    let max_delta = max.saturating_sub(min);
    let net_change = match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() >= 2 => last.saturating_sub(*first),
        _ => 0,
    };

    let points = ordered
        .iter()
        .zip(&values)
        .map(|((ts, sample), &raw_value)| SeriesPoint {
            label: ts.map_or_else(|| sample.snapshot_date.clone(), &labeler),
            raw_value,
            delta: raw_value.saturating_sub(min),
        })
        .collect();

    NormalizedSeries {
        points,
        min,
        max_delta,
        net_change,
        is_constant: max_delta == 0,
    }
}
