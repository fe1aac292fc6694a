//! CLI command implementations.

pub mod common;
pub mod config;
pub mod init;
pub mod record;
pub mod stats;
pub mod tile_url;
pub mod track;
