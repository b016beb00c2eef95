//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use story_core::generation::DEFAULT_TEMPERATURE;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Server-held provider credential. Without it every generation falls back.
    pub openai_api_key: Option<String>,
    /// Any OpenAI-compatible endpoint; the provider default when unset.
    pub openai_base_url: Option<String>,
    pub story_model: String,
    pub story_temperature: f32,
    pub generation_timeout: Duration,
    pub reachability_url: Option<String>,
    pub reachability_timeout: Duration,
    pub cors_origin: String,
}

/// Reads `name`, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address: SocketAddr = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Story Generator Settings ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let openai_base_url = std::env::var("OPENAI_BASE_URL").ok();
        let story_model =
            std::env::var("STORY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let story_temperature: f32 =
            parse_var("STORY_TEMPERATURE", &DEFAULT_TEMPERATURE.to_string())?;
        if !(0.0..=2.0).contains(&story_temperature) {
            return Err(ConfigError::InvalidValue(
                "STORY_TEMPERATURE".to_string(),
                format!("{} is outside 0.0..=2.0", story_temperature),
            ));
        }
        let generation_timeout =
            Duration::from_secs(parse_var::<u64>("GENERATION_TIMEOUT_SECS", "25")?);

        // --- Load Reachability Probe Settings ---
        let reachability_url = std::env::var("REACHABILITY_URL").ok();
        let reachability_timeout =
            Duration::from_millis(parse_var::<u64>("REACHABILITY_TIMEOUT_MS", "3000")?);

        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            openai_base_url,
            story_model,
            story_temperature,
            generation_timeout,
            reachability_url,
            reachability_timeout,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test touching the process environment, so no other test races it.
    #[test]
    fn loads_defaults_and_rejects_bad_values() {
        for name in ["BIND_ADDRESS", "GENERATION_TIMEOUT_SECS", "REACHABILITY_TIMEOUT_MS"] {
            std::env::remove_var(name);
        }
        std::env::set_var("RUST_LOG", "info");
        std::env::remove_var("DATABASE_URL");
        assert!(matches!(Config::from_env(), Err(ConfigError::MissingVar(_))));

        std::env::set_var("DATABASE_URL", "postgres://localhost/stories");
        std::env::set_var("STORY_TEMPERATURE", "hot");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue(name, _)) if name == "STORY_TEMPERATURE"
        ));

        std::env::set_var("STORY_TEMPERATURE", "3.5");
        assert!(Config::from_env().is_err());

        std::env::remove_var("STORY_TEMPERATURE");
        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, "postgres://localhost/stories");
        assert_eq!(config.story_temperature, 0.7);
        assert_eq!(config.generation_timeout, Duration::from_secs(25));
        assert_eq!(config.reachability_timeout, Duration::from_millis(3000));
    }
}
