//! Addressable configuration keys for `config get` / `config set`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use super::ConfigFile;
use crate::model::LayerKind;

/// Errors from parsing a key name or validating a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigKeyError {
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Every `section.key` the configuration file understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ServiceBaseUrl,
    ServiceApiToken,
    ServiceTimeoutSecs,
    TrackingQueueCapacity,
    TrackingMaxAttempts,
    TrackingInitialDelayMs,
    MapDefaultLayer,
    MapDefaultZoom,
    MapDefaultLatitude,
    MapDefaultLongitude,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 12] = [
    ConfigKey::ServiceBaseUrl,
    ConfigKey::ServiceApiToken,
    ConfigKey::ServiceTimeoutSecs,
    ConfigKey::TrackingQueueCapacity,
    ConfigKey::TrackingMaxAttempts,
    ConfigKey::TrackingInitialDelayMs,
    ConfigKey::MapDefaultLayer,
    ConfigKey::MapDefaultZoom,
    ConfigKey::MapDefaultLatitude,
    ConfigKey::MapDefaultLongitude,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceBaseUrl => "service.base_url",
            Self::ServiceApiToken => "service.api_token",
            Self::ServiceTimeoutSecs => "service.timeout_secs",
            Self::TrackingQueueCapacity => "tracking.queue_capacity",
            Self::TrackingMaxAttempts => "tracking.max_attempts",
            Self::TrackingInitialDelayMs => "tracking.initial_delay_ms",
            Self::MapDefaultLayer => "map.default_layer",
            Self::MapDefaultZoom => "map.default_zoom",
            Self::MapDefaultLatitude => "map.default_latitude",
            Self::MapDefaultLongitude => "map.default_longitude",
            Self::LoggingLevel => "logging.level",
            Self::LoggingDirectory => "logging.directory",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or((name, ""))
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::ServiceBaseUrl => config.service.base_url.clone(),
            Self::ServiceApiToken => config.service.api_token.clone().unwrap_or_default(),
            Self::ServiceTimeoutSecs => config.service.timeout_secs.to_string(),
            Self::TrackingQueueCapacity => config.tracking.queue_capacity.to_string(),
            Self::TrackingMaxAttempts => config.tracking.max_attempts.to_string(),
            Self::TrackingInitialDelayMs => config.tracking.initial_delay_ms.to_string(),
            Self::MapDefaultLayer => config.map.default_layer.to_string(),
            Self::MapDefaultZoom => config.map.default_zoom.to_string(),
            Self::MapDefaultLatitude => config.map.default_latitude.to_string(),
            Self::MapDefaultLongitude => config.map.default_longitude.to_string(),
            Self::LoggingLevel => config.logging.level.clone(),
            Self::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate `value` and store it.
    ///
    /// An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            Self::ServiceBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "must start with http:// or https://"));
                }
                config.service.base_url = value.to_string();
            }
            Self::ServiceApiToken => {
                config.service.api_token = non_empty(value).map(str::to_string);
            }
            Self::ServiceTimeoutSecs => {
                config.service.timeout_secs = self.parse_in_range(value, 1..=600)?;
            }
            Self::TrackingQueueCapacity => {
                config.tracking.queue_capacity = self.parse_in_range(value, 1..=100_000)?;
            }
            Self::TrackingMaxAttempts => {
                config.tracking.max_attempts = self.parse_in_range(value, 1..=20)?;
            }
            Self::TrackingInitialDelayMs => {
                config.tracking.initial_delay_ms = self.parse_in_range(value, 0..=60_000)?;
            }
            Self::MapDefaultLayer => {
                config.map.default_layer = value
                    .parse::<LayerKind>()
                    .map_err(|e| self.invalid(value, e))?;
            }
            Self::MapDefaultZoom => {
                config.map.default_zoom = self.parse_in_range(value, 0..=19)?;
            }
            Self::MapDefaultLatitude => {
                config.map.default_latitude = self.parse_in_range(value, -90.0..=90.0)?;
            }
            Self::MapDefaultLongitude => {
                config.map.default_longitude = self.parse_in_range(value, -180.0..=180.0)?;
            }
            Self::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.logging.level = value.to_string();
            }
            Self::LoggingDirectory => {
                config.logging.directory = non_empty(value).map(PathBuf::from);
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl fmt::Display) -> ConfigKeyError {
        ConfigKeyError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_in_range<T>(
        &self,
        value: &str,
        range: std::ops::RangeInclusive<T>,
    ) -> Result<T, ConfigKeyError>
    where
        T: FromStr + PartialOrd + fmt::Display,
        T::Err: fmt::Display,
    {
        let parsed: T = value.parse().map_err(|e| self.invalid(value, e))?;
        if !range.contains(&parsed) {
            return Err(self.invalid(
                value,
                format!("must be between {} and {}", range.start(), range.end()),
            ));
        }
        Ok(parsed)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
