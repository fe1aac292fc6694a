//! Init command - write a configuration file with defaults.

use trailmap::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command. Existing settings are kept.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    let existed = path.exists();

    let config = ConfigFile::load()?;
    config.save()?;

    if existed {
        println!("Configuration file updated: {}", path.display());
    } else {
        println!("Configuration file created: {}", path.display());
    }
    println!();
    println!("Service: {}", config.service.base_url);
    println!();
    println!("Edit this file or use 'trailmap config set' to customize settings.");
    Ok(())
}
