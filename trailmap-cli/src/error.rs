//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;
use trailmap::config::ConfigError;
use trailmap::logging::LoggingError;
use trailmap::map::TileError;
use trailmap::service::ServiceError;
use trailmap::tracking::TrackingError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid argument or configuration value.
    #[error("{0}")]
    Config(String),

    #[error("configuration file: {0}")]
    ConfigFile(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("data service: {0}")]
    Service(#[from] ServiceError),

    #[error("tracking: {0}")]
    Tracking(#[from] TrackingError),

    #[error(transparent)]
    Tile(#[from] TileError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
