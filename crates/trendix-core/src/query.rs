//! Query-string handling for the trend proxy.
//!
//! Raw parameters arrive as optional strings and are resolved into a
//! [`TrendWindow`] with every value already defaulted and clamped, so nothing
//! out of bounds is ever forwarded to the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_config::TrendBounds;

pub const DEFAULT_PLATFORM: &str = "youtube";

/// The only velocity window besides the default of 1 day.
const WIDE_VELOCITY_DAYS: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported platform '{0}'")]
    Unsupported(String),
}

/// Raw trend query as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendQuery {
    pub platform: Option<String>,
    pub limit: Option<String>,
    pub days: Option<String>,
    pub velocity_days: Option<String>,
}

/// A fully-resolved trend request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendWindow {
    pub platform: String,
    pub limit: u32,
    pub days: u32,
    pub velocity_days: u32,
}

impl TrendQuery {
    /// Builds a query from decoded key/value pairs. A repeated key keeps its
    /// first value; unknown keys are ignored.
    #[must_use]
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                "platform" => &mut query.platform,
                "limit" => &mut query.limit,
                "days" => &mut query.days,
                "velocity_days" => &mut query.velocity_days,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        query
    }

    /// Applies defaults and bounds to every parameter.
    ///
    /// Unparseable numbers and NaN fall back to the default, infinities clamp
    /// to the nearest bound, fractional values are floored, and the result is
    /// clamped. `velocity_days` collapses
    /// to 1 for anything other than exactly 3.
    #[must_use]
    pub fn resolve(&self, bounds: &TrendBounds) -> TrendWindow {
        let platform = self
            .platform
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PLATFORM)
            .to_lowercase();

        let limit = clamp_param(
            self.limit.as_deref(),
            bounds.default_limit,
            bounds.min_limit,
            bounds.max_limit,
        );
        let days = clamp_param(
            self.days.as_deref(),
            bounds.default_days,
            bounds.min_days,
            bounds.max_days,
        );

        TrendWindow {
            platform,
            limit,
            days,
            velocity_days: collapse_velocity_days(self.velocity_days.as_deref()),
        }
    }
}

impl TrendWindow {
    /// Checks the platform against a lowercased allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] when the platform is not listed.
    pub fn ensure_supported(&self, platforms: &[String]) -> Result<(), PlatformError> {
        if platforms.iter().any(|p| *p == self.platform) {
            Ok(())
        } else {
            Err(PlatformError::Unsupported(self.platform.clone()))
        }
    }
}

/// Parses a numeric query value. Empty strings and NaN count as absent.
fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_param(raw: Option<&str>, default: u32, min: u32, max: u32) -> u32 {
    match parse_number(raw) {
        Some(value) => value.floor().clamp(f64::from(min), f64::from(max)) as u32,
        None => default.clamp(min, max),
    }
}

fn collapse_velocity_days(raw: Option<&str>) -> u32 {
    match parse_number(raw) {
        Some(v) if (v - f64::from(WIDE_VELOCITY_DAYS)).abs() < f64::EPSILON => WIDE_VELOCITY_DAYS,
        _ => 1,
    }
}
