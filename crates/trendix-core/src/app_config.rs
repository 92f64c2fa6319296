use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Bounds applied to the `limit` and `days` query parameters of the trend
/// proxy before anything is forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendBounds {
    pub min_limit: u32,
    pub max_limit: u32,
    pub default_limit: u32,
    pub min_days: u32,
    pub max_days: u32,
    pub default_days: u32,
}

impl Default for TrendBounds {
    fn default() -> Self {
        Self {
            min_limit: 1,
            max_limit: 50,
            default_limit: 10,
            min_days: 1,
            max_days: 30,
            default_days: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Backend base URL. `None` is reported per request, not at startup.
    pub api_base_url: Option<String>,
    pub backend_timeout_secs: u64,
    pub user_agent: String,
    /// Lowercased platform allow-list.
    pub platforms: Vec<String>,
    pub history_limit: u32,
    pub bounds: TrendBounds,
}

impl AppConfig {
    #[must_use]
    pub fn supports_platform(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p == platform)
    }
}
