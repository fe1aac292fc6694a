//! Shared setup for commands that talk to the data service.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::info;
use trailmap::config::ConfigFile;
use trailmap::logging::{init_logging, LoggingGuard};
use trailmap::service::{DataService, HttpDataService};

use crate::error::CliError;

/// Loaded configuration, installed logging and an async runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(&config.logging_config())?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;
        Ok(Self {
            config,
            runtime,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = trailmap::VERSION,
            command,
            base_url = %self.config.service.base_url,
            "Trailmap starting"
        );
    }

    /// HTTP client for the configured data service.
    pub fn create_service(&self) -> Result<Arc<dyn DataService>, CliError> {
        let service = HttpDataService::new(&self.config.service_config())?;
        Ok(Arc::new(service))
    }
}
