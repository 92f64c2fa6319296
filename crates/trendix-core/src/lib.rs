pub mod app_config;
pub mod chat;
pub mod compare;
pub mod config;
pub mod format;
pub mod history;
pub mod lenient;
pub mod query;
pub mod trends;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, TrendBounds};
pub use config::{load_app_config, load_app_config_from_env};
pub use history::{normalize, normalize_with_labels, HistorySample, Metric, NormalizedSeries};
pub use query::{PlatformError, TrendQuery, TrendWindow};
pub use trends::{project, ProjectedTrendRecord, TrendRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
