mod history;
mod trends;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use trendix_backend::{BackendError, TrendixClient};
use trendix_core::AppConfig;

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// The backend client as configured at startup.
#[derive(Debug, Clone)]
pub enum Backend {
    Ready(TrendixClient),
    /// No base URL configured.
    Missing,
    /// A base URL is configured but no client could be built from it.
    Invalid(String),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Backend,
}

impl AppState {
    /// Never fails: configuration problems with the backend are logged here
    /// and reported per request as server errors.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let backend = match TrendixClient::from_config(&config) {
            Ok(Some(client)) => Backend::Ready(client),
            Ok(None) => {
                tracing::warn!(
                    "TRENDIX_API_BASE_URL not set; trend and history routes will answer 500"
                );
                Backend::Missing
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "backend client could not be built; trend and history routes will answer 500"
                );
                Backend::Invalid(e.to_string())
            }
        };
        Self { config, backend }
    }

    pub(super) fn client(&self, request_id: &str) -> Result<&TrendixClient, ProxyFailure> {
        match &self.backend {
            Backend::Ready(client) => Ok(client),
            Backend::Missing => {
                tracing::error!(request_id, "backend base URL is not configured");
                Err(ProxyFailure::MissingBaseUrl)
            }
            Backend::Invalid(reason) => {
                tracing::error!(request_id, reason = %reason, "backend base URL is invalid");
                Err(ProxyFailure::InvalidBaseUrl(reason.clone()))
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    backend_configured: bool,
}

/// Why a proxied request produced no data. Every variant still renders a
/// structurally complete response body.
#[derive(Debug)]
pub(super) enum ProxyFailure {
    BadQuery(String),
    UnsupportedPlatform(String),
    MissingBaseUrl,
    InvalidBaseUrl(String),
    BadGateway { status: u16, body: String },
    Transport,
}

impl ProxyFailure {
    pub(super) fn status(&self) -> StatusCode {
        match self {
            ProxyFailure::BadQuery(_) | ProxyFailure::UnsupportedPlatform(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyFailure::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            ProxyFailure::MissingBaseUrl
            | ProxyFailure::InvalidBaseUrl(_)
            | ProxyFailure::Transport => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(super) fn message(&self) -> String {
        match self {
            ProxyFailure::BadQuery(reason) => format!("invalid query string: {reason}"),
            ProxyFailure::UnsupportedPlatform(platform) => {
                format!("platform '{platform}' is not supported")
            }
            ProxyFailure::MissingBaseUrl => {
                "backend API base URL (TRENDIX_API_BASE_URL) is not configured".to_string()
            }
            ProxyFailure::InvalidBaseUrl(reason) => {
                format!("backend API base URL (TRENDIX_API_BASE_URL) is invalid: {reason}")
            }
            ProxyFailure::BadGateway { status, .. } => format!("backend request failed: {status}"),
            ProxyFailure::Transport => "failed to fetch data from the backend".to_string(),
        }
    }

    pub(super) fn backend_error(&self) -> Option<String> {
        match self {
            ProxyFailure::BadGateway { body, .. } => Some(body.clone()),
            _ => None,
        }
    }

    pub(super) fn from_backend(request_id: &str, error: BackendError) -> Self {
        match error {
            BackendError::Status { status, body } => {
                tracing::warn!(request_id, status, "backend returned non-success status");
                ProxyFailure::BadGateway { status, body }
            }
            other => {
                tracing::error!(request_id, error = %other, "backend request failed");
                ProxyFailure::Transport
            }
        }
    }
}

/// First value of `key` in a decoded query string.
pub(super) fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/trends/videos", get(trends::list_trend_videos))
        .route(
            "/api/trends/videos/{video_id}/history",
            get(history::get_video_history),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            backend_configured: matches!(state.backend, Backend::Ready(_)),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
