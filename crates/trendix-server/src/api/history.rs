use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use trendix_core::{normalize, query::DEFAULT_PLATFORM, Metric, NormalizedSeries};

use crate::middleware::RequestId;

use super::{first_value, AppState, ProxyFailure};

#[derive(Debug, Serialize)]
pub(super) struct HistoryResponse {
    video_id: String,
    platform: String,
    metric: String,
    series: NormalizedSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend_error: Option<String>,
}

/// `GET /api/trends/videos/{video_id}/history`: fetches the snapshot history
/// of one video and returns it as a delta-scaled series for one metric.
///
/// Every failure still carries the empty series so the caller can render a
/// "no data" chart.
pub(super) async fn get_video_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(video_id): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> (StatusCode, Json<HistoryResponse>) {
    let (pairs, rejection) = match query {
        Ok(Query(pairs)) => (pairs, None),
        Err(rejection) => (Vec::new(), Some(rejection)),
    };

    let platform = first_value(&pairs, "platform")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PLATFORM)
        .to_lowercase();
    let raw_metric = first_value(&pairs, "metric").unwrap_or("views");

    let mut response = HistoryResponse {
        video_id,
        platform,
        metric: raw_metric.trim().to_lowercase(),
        series: NormalizedSeries::empty(),
        message: None,
        backend_error: None,
    };

    if let Some(rejection) = rejection {
        tracing::warn!(request_id = %req_id.0, error = %rejection, "undecodable query string");
        return fail(response, ProxyFailure::BadQuery(rejection.body_text()));
    }

    let metric = match raw_metric.parse::<Metric>() {
        Ok(metric) => metric,
        Err(reason) => {
            response.message = Some(reason);
            return (StatusCode::BAD_REQUEST, Json(response));
        }
    };

    if !state.config.supports_platform(&response.platform) {
        tracing::warn!(
            request_id = %req_id.0,
            platform = %response.platform,
            "unsupported platform requested"
        );
        let failure = ProxyFailure::UnsupportedPlatform(response.platform.clone());
        return fail(response, failure);
    }

    let client = match state.client(&req_id.0) {
        Ok(client) => client,
        Err(failure) => return fail(response, failure),
    };

    match client
        .fetch_view_history(
            &response.video_id,
            &response.platform,
            state.config.history_limit,
        )
        .await
    {
        Ok(samples) => {
            response.series = normalize(&samples, metric);
            tracing::info!(
                request_id = %req_id.0,
                video_id = %response.video_id,
                metric = %metric,
                points = response.series.points.len(),
                "video history served"
            );
            (StatusCode::OK, Json(response))
        }
        Err(e) => {
            let failure = ProxyFailure::from_backend(&req_id.0, e);
            fail(response, failure)
        }
    }
}

fn fail(
    mut response: HistoryResponse,
    failure: ProxyFailure,
) -> (StatusCode, Json<HistoryResponse>) {
    response.message = Some(failure.message());
    response.backend_error = failure.backend_error();
    (failure.status(), Json(response))
}
