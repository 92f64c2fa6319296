//! Head-to-head comparison of two videos.

use serde::Serialize;

use crate::history::{normalize, HistorySample, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    A,
    B,
    Tie,
}

/// Picks the larger of two values. Incomparable values (NaN) tie.
pub fn winner<T: PartialOrd>(a: &T, b: &T) -> Winner {
    if a > b {
        Winner::A
    } else if b > a {
        Winner::B
    } else {
        Winner::Tie
    }
}

/// Comparable figures for one video, derived from its history feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSnapshot {
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    /// Views gained over the history window, as a percentage of the first snapshot.
    pub view_growth_rate: f64,
    /// Likes per view of the latest snapshot, as a percentage.
    pub like_ratio: f64,
}

impl VideoSnapshot {
    /// Builds a snapshot from a (possibly unordered) history feed.
    ///
    /// Counts come from the newest sample. An empty feed yields all zeros.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_history(samples: &[HistorySample]) -> Self {
        let views = normalize(samples, Metric::Views);
        let latest = samples
            .iter()
            .filter(|s| s.timestamp().is_some())
            .max_by_key(|s| s.timestamp())
            .or_else(|| samples.last());

        let Some(latest) = latest else {
            return Self {
                view_count: 0,
                like_count: 0,
                comment_count: 0,
                view_growth_rate: 0.0,
                like_ratio: 0.0,
            };
        };

        let first_views = views.points.first().map_or(0, |p| p.raw_value);
        let view_growth_rate = if views.points.len() >= 2 && first_views != 0 {
            views.net_change as f64 / first_views as f64 * 100.0
        } else {
            0.0
        };

        let like_ratio = if latest.view_count != 0 {
            latest.like_count as f64 / latest.view_count as f64 * 100.0
        } else {
            0.0
        };

        Self {
            view_count: latest.view_count,
            like_count: latest.like_count,
            comment_count: latest.comment_count,
            view_growth_rate,
            like_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub views: Winner,
    pub likes: Winner,
    pub comments: Winner,
    pub view_growth_rate: Winner,
    pub like_ratio: Winner,
    pub overall: Winner,
}

#[must_use]
pub fn compare(a: &VideoSnapshot, b: &VideoSnapshot) -> Comparison {
    let views = winner(&a.view_count, &b.view_count);
    let likes = winner(&a.like_count, &b.like_count);
    let comments = winner(&a.comment_count, &b.comment_count);
    let view_growth_rate = winner(&a.view_growth_rate, &b.view_growth_rate);
    let like_ratio = winner(&a.like_ratio, &b.like_ratio);

    let all = [views, likes, comments, view_growth_rate, like_ratio];
    let wins_a = all.iter().filter(|w| **w == Winner::A).count();
    let wins_b = all.iter().filter(|w| **w == Winner::B).count();

    Comparison {
        views,
        likes,
        comments,
        view_growth_rate,
        like_ratio,
        overall: winner(&wins_a, &wins_b),
    }
}
