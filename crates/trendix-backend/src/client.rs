//! HTTP client for the Trendix backend REST API.
//!
//! Wraps `reqwest` with decoding of the trend and view-history endpoints.
//! Non-success responses surface as [`BackendError::Status`] with the raw body
//! attached. List entries are decoded leniently, one record per entry.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use trendix_core::{AppConfig, HistorySample, TrendRecord, TrendWindow};

use crate::error::BackendError;

/// Client for the backend trend API.
///
/// Use [`TrendixClient::new`] with an explicit base URL (a mock server in
/// tests), or [`TrendixClient::from_config`] to build one from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct TrendixClient {
    client: Client,
    base_url: Url,
}

impl TrendixClient {
    /// Creates a client rooted at `base_url`. Any path on the base URL is
    /// kept as a prefix for every endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`BackendError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, BackendError> {
        let invalid = |reason: String| BackendError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(invalid("expected an http or https URL".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Builds a client from application config.
    ///
    /// Returns `Ok(None)` when no backend base URL is configured.
    ///
    /// # Errors
    ///
    /// See [`TrendixClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, BackendError> {
        config
            .api_base_url
            .as_deref()
            .map(|url| Self::new(url, config.backend_timeout_secs, &config.user_agent))
            .transpose()
    }

    /// Fetches trending videos for a resolved window.
    ///
    /// Calls `GET /trends/videos`. A missing or non-array `items` field
    /// yields an empty list; otherwise every entry yields one record.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Http`] on network failure.
    /// - [`BackendError::Status`] on a non-2xx response.
    /// - [`BackendError::Deserialize`] if the body is not JSON.
    pub async fn fetch_trend_videos(
        &self,
        window: &TrendWindow,
    ) -> Result<Vec<TrendRecord>, BackendError> {
        let url = self.build_url(
            &["trends", "videos"],
            &[
                ("platform", &window.platform),
                ("limit", &window.limit.to_string()),
                ("days", &window.days.to_string()),
                ("velocity_days", &window.velocity_days.to_string()),
            ],
        );
        let body = self.request_json(&url).await?;
        Ok(list_field(&body, "items")
            .iter()
            .map(TrendRecord::from_value)
            .collect())
    }

    /// Fetches the daily view/like history for one video.
    ///
    /// Calls `GET /trends/videos/{video_id}/view_history`. A missing
    /// `history` field yields an empty list.
    ///
    /// # Errors
    ///
    /// Same as [`TrendixClient::fetch_trend_videos`].
    pub async fn fetch_view_history(
        &self,
        video_id: &str,
        platform: &str,
        limit: u32,
    ) -> Result<Vec<HistorySample>, BackendError> {
        let url = self.build_url(
            &["trends", "videos", video_id, "view_history"],
            &[("platform", platform), ("limit", &limit.to_string())],
        );
        let body = self.request_json(&url).await?;
        Ok(decode_list(&body, "history", "history sample"))
    }

    /// Appends percent-encoded path segments and query parameters to the
    /// base URL.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        // Infallible: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request and parses a 2xx body as JSON.
    async fn request_json(&self, url: &Url) -> Result<Value, BackendError> {
        tracing::debug!(url = %url, "backend request");
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

/// `body[field]` as a slice; empty when missing or not an array.
fn list_field<'a>(body: &'a Value, field: &str) -> &'a [Value] {
    body.get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Decodes `body[field]` as a list, skipping entries that do not fit `T`.
fn decode_list<T>(body: &Value, field: &str, what: &str) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    list_field(body, field)
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value::<T>(entry.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "skipping malformed {what}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
