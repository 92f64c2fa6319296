//! Tolerant readers for loosely typed backend JSON.
//!
//! The backend does not promise integer counts: hidden like counts arrive as
//! `null`, some exports send floats or numeric strings. These helpers never
//! fail, so one odd field cannot drop a whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a count from a JSON integer, float, or numeric string.
///
/// Fractions truncate toward zero and out-of-range values saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn value_as_count(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
        .map(|v| v as i64)
}

/// Reads a string field, rendering non-string scalars as text.
#[must_use]
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `deserialize_with` for counts: anything unreadable becomes 0.
pub(crate) fn count_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_as_count).unwrap_or(0))
}

/// `deserialize_with` for text: `null` becomes the empty string.
pub(crate) fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_as_text).unwrap_or_default())
}
