//! Trend re-ranking and field projection.
//!
//! The backend already returns trending videos ordered by surge score, but the
//! proxy re-sorts anyway and trims each record down to a fixed allow-list of
//! fields before handing it to the dashboard.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A trending video as returned by the backend.
///
/// Every named field is kept as raw JSON: the proxy passes values through
/// as-is, whatever their type. Unknown fields are collected into `extra` and
/// never forwarded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrendRecord {
    pub video_id: Option<Value>,
    pub title: Option<Value>,
    pub channel_id: Option<Value>,
    pub channel_username: Option<Value>,
    pub platform: Option<Value>,
    pub category: Option<Value>,
    pub category_id: Option<Value>,
    pub view_count: Option<Value>,
    pub like_count: Option<Value>,
    pub comment_count: Option<Value>,
    pub published_at: Option<Value>,
    pub thumbnail_url: Option<Value>,
    pub crawled_at: Option<Value>,
    pub surge_score: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrendRecord {
    /// The score used for ranking: the surge score when it is a finite
    /// number, negative infinity otherwise.
    #[must_use]
    pub fn rank_score(&self) -> f64 {
        self.surge_score
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite())
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Decodes one backend list entry. Never fails: an entry that is not a
    /// JSON object becomes a record with every field absent, so it still
    /// occupies its slot in the ranking.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// The allow-listed subset of a [`TrendRecord`] sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedTrendRecord {
    pub video_id: Option<Value>,
    pub title: Option<Value>,
    pub channel_id: Option<Value>,
    pub channel_username: Option<Value>,
    pub platform: Option<Value>,
    pub category: Option<Value>,
    pub category_id: Option<Value>,
    pub view_count: Option<Value>,
    pub like_count: Option<Value>,
    pub comment_count: Option<Value>,
    pub published_at: Option<Value>,
    pub thumbnail_url: Option<Value>,
    pub crawled_at: Option<Value>,
    pub surge_score: Option<Value>,
}

impl From<&TrendRecord> for ProjectedTrendRecord {
    fn from(record: &TrendRecord) -> Self {
        Self {
            video_id: record.video_id.clone(),
            title: record.title.clone(),
            channel_id: record.channel_id.clone(),
            channel_username: record.channel_username.clone(),
            platform: record.platform.clone(),
            category: record.category.clone(),
            category_id: record.category_id.clone(),
            view_count: record.view_count.clone(),
            like_count: record.like_count.clone(),
            comment_count: record.comment_count.clone(),
            published_at: record.published_at.clone(),
            thumbnail_url: record.thumbnail_url.clone(),
            crawled_at: record.crawled_at.clone(),
            surge_score: record.surge_score.clone(),
        }
    }
}

/// Ranks records by surge score (descending) and projects the top `limit`.
///
/// The sort is stable: records with equal scores keep their input order, and
/// records without a numeric score go last. The input slice is not touched.
#[must_use]
pub fn project(records: &[TrendRecord], limit: usize) -> Vec<ProjectedTrendRecord> {
    let mut ranked: Vec<&TrendRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.rank_score()
            .partial_cmp(&a.rank_score())
            .unwrap_or(Ordering::Equal)
    });

    ranked
        .into_iter()
        .take(limit)
        .map(ProjectedTrendRecord::from)
        .collect()
}
