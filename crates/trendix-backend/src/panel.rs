//! Selected-video history state with stale-response protection.
//!
//! Every selection hands out a [`LoadToken`]. A fetched result is only
//! committed if its token is still the current one, so a slow response for
//! video A can never replace what is shown after the user moved on to B.

use std::sync::Arc;

use tokio::sync::Mutex;
use trendix_core::{normalize, HistorySample, Metric, NormalizedSeries};

use crate::client::TrendixClient;

/// Both charts shown for a selected video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCharts {
    pub views: NormalizedSeries,
    pub likes: NormalizedSeries,
}

impl HistoryCharts {
    #[must_use]
    pub fn from_samples(samples: &[HistorySample]) -> Self {
        Self {
            views: normalize(samples, Metric::Views),
            likes: normalize(samples, Metric::Likes),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            views: NormalizedSeries::empty(),
            likes: NormalizedSeries::empty(),
        }
    }
}

/// Identifies one load request for one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadToken {
    generation: u64,
    video_id: String,
}

impl LoadToken {
    #[must_use]
    pub fn video_id(&self) -> &str {
        &self.video_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Loading { video_id: String },
    Ready { video_id: String, charts: HistoryCharts },
}

#[derive(Debug)]
struct PanelInner {
    generation: u64,
    state: PanelState,
}

/// Shared, cloneable handle to the detail panel state.
#[derive(Debug, Clone)]
pub struct HistoryPanel {
    inner: Arc<Mutex<PanelInner>>,
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryPanel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PanelInner {
                generation: 0,
                state: PanelState::Idle,
            })),
        }
    }

    /// Selects a video and invalidates every outstanding token.
    pub async fn select(&self, video_id: impl Into<String>) -> LoadToken {
        let video_id = video_id.into();
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.state = PanelState::Loading {
            video_id: video_id.clone(),
        };
        LoadToken {
            generation: inner.generation,
            video_id,
        }
    }

    /// Dismisses the panel. Pending loads are discarded when they finish.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.state = PanelState::Idle;
    }

    /// Applies `charts` if `token` is still current. Returns whether it was applied.
    pub async fn commit(&self, token: LoadToken, charts: HistoryCharts) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.generation != token.generation {
            return false;
        }
        inner.state = PanelState::Ready {
            video_id: token.video_id,
            charts,
        };
        true
    }

    pub async fn state(&self) -> PanelState {
        self.inner.lock().await.state.clone()
    }

    /// Fetches and normalizes history for the token's video, then commits it.
    ///
    /// Fetch failures are logged and committed as empty charts so the panel
    /// leaves its loading state. Returns whether the result was applied.
    pub async fn load(
        &self,
        client: &TrendixClient,
        token: LoadToken,
        platform: &str,
        limit: u32,
    ) -> bool {
        let charts = match client
            .fetch_view_history(token.video_id(), platform, limit)
            .await
        {
            Ok(samples) => {
                tracing::debug!(
                    video_id = token.video_id(),
                    samples = samples.len(),
                    "view history loaded"
                );
                HistoryCharts::from_samples(&samples)
            }
            Err(e) => {
                tracing::warn!(
                    video_id = token.video_id(),
                    error = %e,
                    "failed to fetch view history"
                );
                HistoryCharts::empty()
            }
        };

        let video_id = token.video_id.clone();
        let applied = self.commit(token, charts).await;
        if !applied {
            tracing::debug!(video_id = %video_id, "discarding stale view history");
        }
        applied
    }
}
