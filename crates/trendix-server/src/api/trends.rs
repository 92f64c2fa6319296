use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use trendix_core::{project, ProjectedTrendRecord, TrendQuery, TrendWindow};

use crate::middleware::RequestId;

use super::{AppState, ProxyFailure};

#[derive(Debug, Serialize)]
pub(super) struct TrendsMeta {
    platform: String,
    /// Number of items actually returned.
    limit: usize,
    requested_limit: u32,
    days: u32,
    velocity_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendsResponse {
    items: Vec<ProjectedTrendRecord>,
    meta: TrendsMeta,
}

impl TrendsResponse {
    fn success(window: &TrendWindow, items: Vec<ProjectedTrendRecord>) -> Self {
        Self {
            meta: TrendsMeta {
                platform: window.platform.clone(),
                limit: items.len(),
                requested_limit: window.limit,
                days: window.days,
                velocity_days: window.velocity_days,
                message: None,
                backend_error: None,
            },
            items,
        }
    }

    fn failure(window: &TrendWindow, failure: &ProxyFailure) -> Self {
        Self {
            items: Vec::new(),
            meta: TrendsMeta {
                platform: window.platform.clone(),
                limit: 0,
                requested_limit: window.limit,
                days: window.days,
                velocity_days: window.velocity_days,
                message: Some(failure.message()),
                backend_error: failure.backend_error(),
            },
        }
    }
}

/// `GET /api/trends/videos`: proxies the backend trend list, re-ranks it by
/// surge score and trims each item to the public field set.
///
/// A repeated query key keeps its first value.
pub(super) async fn list_trend_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> (StatusCode, Json<TrendsResponse>) {
    let Query(pairs) = match query {
        Ok(query) => query,
        Err(rejection) => {
            let window = TrendQuery::default().resolve(&state.config.bounds);
            tracing::warn!(request_id = %req_id.0, error = %rejection, "undecodable query string");
            let failure = ProxyFailure::BadQuery(rejection.body_text());
            return (
                failure.status(),
                Json(TrendsResponse::failure(&window, &failure)),
            );
        }
    };
    let window = TrendQuery::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .resolve(&state.config.bounds);

    match fetch_ranked(&state, &req_id.0, &window).await {
        Ok(items) => {
            tracing::info!(
                request_id = %req_id.0,
                platform = %window.platform,
                returned = items.len(),
                requested = window.limit,
                "trend videos served"
            );
            (
                StatusCode::OK,
                Json(TrendsResponse::success(&window, items)),
            )
        }
        Err(failure) => (
            failure.status(),
            Json(TrendsResponse::failure(&window, &failure)),
        ),
    }
}

async fn fetch_ranked(
    state: &AppState,
    request_id: &str,
    window: &TrendWindow,
) -> Result<Vec<ProjectedTrendRecord>, ProxyFailure> {
    if window.ensure_supported(&state.config.platforms).is_err() {
        tracing::warn!(request_id, platform = %window.platform, "unsupported platform requested");
        return Err(ProxyFailure::UnsupportedPlatform(window.platform.clone()));
    }

    let client = state.client(request_id)?;

    let records = client
        .fetch_trend_videos(window)
        .await
        .map_err(|e| ProxyFailure::from_backend(request_id, e))?;

    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
    Ok(project(&records, limit))
}
