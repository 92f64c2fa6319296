use thiserror::Error;

/// Errors returned by the backend API client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status. `body` is the raw
    /// response text, kept for diagnostics.
    #[error("backend returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
