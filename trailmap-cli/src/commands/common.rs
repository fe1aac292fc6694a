//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use trailmap::analytics::TrackSummary;
use trailmap::model::LayerKind;

use crate::error::CliError;

/// Tile layer selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum LayerArg {
    /// OpenStreetMap street map
    Base,
    /// ArcGIS World Imagery
    Satellite,
}

impl From<LayerArg> for LayerKind {
    fn from(layer: LayerArg) -> Self {
        match layer {
            LayerArg::Base => LayerKind::Base,
            LayerArg::Satellite => LayerKind::Satellite,
        }
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Print a summary block for a track.
pub fn print_summary(summary: &TrackSummary) {
    println!("  Points:         {}", summary.point_count);
    println!("  Distance:       {:.2} km", summary.distance_km());
    println!("  Duration:       {} min", summary.duration_minutes());
    println!("  Average speed:  {:.1} km/h", summary.average_speed_kmh());
    println!("  Max speed:      {:.1} km/h", summary.max_speed_kmh());
    println!("  Elevation gain: {:.0} m", summary.elevation_gain_m);
    if let Some(bounds) = summary.bounds {
        println!(
            "  Bounds:         {:.5},{:.5} .. {:.5},{:.5}",
            bounds.south, bounds.west, bounds.north, bounds.east
        );
    }
    if !summary.timestamps_monotonic {
        println!("  Warning: timestamps go backwards; duration may be understated");
    }
}
