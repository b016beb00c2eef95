//! services/api/src/error.rs
//!
//! Everything that can stop the service before it starts answering requests.
//! Handlers never see this type; they map their own failures to status codes.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting to PostgreSQL failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A pending migration could not be applied.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The reachability probe's HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Binding or serving the listener.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid startup setting: {0}")]
    Internal(String),
}
