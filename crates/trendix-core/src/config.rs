use crate::app_config::{AppConfig, Environment, TrendBounds};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can feed a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("TRENDIX_ENV", "development"))?;

    let bind_addr = or_default("TRENDIX_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TRENDIX_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TRENDIX_LOG_LEVEL", "info");

    // An empty value counts as unset: the proxy reports it per request.
    let api_base_url = lookup("TRENDIX_API_BASE_URL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let backend_timeout_secs = parse_u64("TRENDIX_BACKEND_TIMEOUT_SECS", "15")?;
    if backend_timeout_secs == 0 {
        return Err(invalid(
            "TRENDIX_BACKEND_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let user_agent = or_default("TRENDIX_USER_AGENT", "trendix/0.1 (trend-dashboard)");

    let platforms = parse_platforms(&or_default("TRENDIX_PLATFORMS", "youtube"));
    if platforms.is_empty() {
        return Err(invalid(
            "TRENDIX_PLATFORMS",
            "at least one platform is required".to_string(),
        ));
    }

    let history_limit = parse_u32("TRENDIX_HISTORY_LIMIT", "30")?;
    if history_limit == 0 {
        return Err(invalid(
            "TRENDIX_HISTORY_LIMIT",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        api_base_url,
        backend_timeout_secs,
        user_agent,
        platforms,
        history_limit,
        bounds: TrendBounds::default(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDIX_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Split a comma-separated allow-list, lowercasing and dropping blanks.
fn parse_platforms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
