use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "https://maestro-api-dev.secil.biz";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let bootstrap_token = require("VITRINE_BOOTSTRAP_TOKEN")?;
    if bootstrap_token.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_BOOTSTRAP_TOKEN".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let env = parse_environment(&or_default("VITRINE_ENV", "development"))?;
    let log_level = or_default("VITRINE_LOG_LEVEL", "info");
    let api_base_url = or_default("VITRINE_API_BASE_URL", DEFAULT_API_BASE_URL);
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_API_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{api_base_url}\""),
        });
    }

    let request_timeout_secs = parse_u64("VITRINE_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let user_agent = or_default("VITRINE_USER_AGENT", "vitrine/0.1 (merchandising)");

    let page_size = parse_u32("VITRINE_PAGE_SIZE", "36")?;
    if page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_PAGE_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let pin_store_path = PathBuf::from(or_default(
        "VITRINE_PIN_STORE_PATH",
        "./.vitrine/pins.json",
    ));
    let session_path = PathBuf::from(or_default(
        "VITRINE_SESSION_PATH",
        "./.vitrine/session.json",
    ));
    let session_max_age_secs = parse_i64("VITRINE_SESSION_MAX_AGE_SECS", "86400")?;
    if session_max_age_secs < 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_SESSION_MAX_AGE_SECS".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    let default_username = lookup("VITRINE_USERNAME").ok();
    let default_password = lookup("VITRINE_PASSWORD").ok();

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        bootstrap_token,
        request_timeout_secs,
        user_agent,
        page_size,
        pin_store_path,
        session_path,
        session_max_age_secs,
        default_username,
        default_password,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
