//! INI configuration file.
//!
//! Settings live at `<config dir>/trailmap/config.ini`:
//!
//! ```ini
//! [service]
//! base_url = http://localhost:8000/api/v1
//! api_token =
//! timeout_secs = 30
//!
//! [tracking]
//! queue_capacity = 256
//! max_attempts = 3
//! initial_delay_ms = 200
//!
//! [map]
//! default_layer = base
//! default_zoom = 13
//! default_latitude = 55.7558
//! default_longitude = 37.6176
//!
//! [logging]
//! level = info
//! directory =
//! ```
//!
//! Missing files and missing keys fall back to defaults. Present keys are
//! parsed with the same validation `config set` applies.

mod keys;

pub use keys::{ConfigKey, ConfigKeyError};

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::dispatch::{DispatchConfig, RetryPolicy};
use crate::logging::LoggingConfig;
use crate::model::{LatLng, LayerKind, ViewState};
use crate::service::ServiceConfig;
use crate::tracking::SessionConfig;

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "trailmap";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid INI.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A key holds a value that does not validate.
    #[error("{path}: {source}")]
    InvalidValue {
        path: PathBuf,
        #[source]
        source: ConfigKeyError,
    },
}

/// `[service]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: crate::service::DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_secs: crate::service::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            queue_capacity: crate::dispatch::DEFAULT_QUEUE_CAPACITY,
            max_attempts: crate::dispatch::DEFAULT_MAX_ATTEMPTS,
            initial_delay_ms: crate::dispatch::DEFAULT_INITIAL_DELAY_MS,
        }
    }
}

/// `[map]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub default_layer: LayerKind,
    pub default_zoom: u8,
    pub default_latitude: f64,
    pub default_longitude: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_layer: LayerKind::Base,
            default_zoom: 13,
            default_latitude: 55.7558,
            default_longitude: 37.6176,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: crate::logging::DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub service: ServiceSettings,
    pub tracking: TrackingSettings,
    pub map: MapSettings,
    pub logging: LoggingSettings,
}

/// Platform configuration directory for this application.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

impl ConfigFile {
    /// Load from the default path, or defaults if the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file missing, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_ini(&ini).map_err(|source| ConfigError::InvalidValue {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        debug!(path = %path.display(), "Config file saved");
        Ok(())
    }

    /// Parse from an INI document. Absent keys keep their defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigKeyError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    pub fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::new(self.service.base_url.clone())
            .with_timeout(Duration::from_secs(self.service.timeout_secs));
        if let Some(token) = &self.service.api_token {
            config = config.with_api_token(token.clone());
        }
        config
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            dispatch: DispatchConfig::default()
                .with_queue_capacity(self.tracking.queue_capacity)
                .with_retry(RetryPolicy::backoff(
                    self.tracking.max_attempts,
                    Duration::from_millis(self.tracking.initial_delay_ms),
                )),
            ..SessionConfig::default()
        }
    }

    /// Initial map view.
    pub fn default_view(&self) -> ViewState {
        ViewState::new(
            LatLng::new(self.map.default_latitude, self.map.default_longitude),
            self.map.default_zoom,
            self.map.default_layer,
        )
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.logging.level.clone(),
            directory: self.logging.directory.clone(),
            ..LoggingConfig::default()
        }
    }
}
