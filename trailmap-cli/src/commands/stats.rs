//! Stats command - summarize a track file offline.

use std::path::Path;

use trailmap::analytics::TrackSummary;
use trailmap::model::{GeoPoint, Track};

use super::common::{print_summary, read_json};
use crate::error::CliError;

/// Run the stats command.
pub fn run(file: &Path) -> Result<(), CliError> {
    let (title, points) = load_points(file)?;
    println!("{}", title);
    print_summary(&TrackSummary::from_points(&points));
    Ok(())
}

/// Accept either a full track object or a bare point array.
fn load_points(file: &Path) -> Result<(String, Vec<GeoPoint>), CliError> {
    match read_json::<Track>(file) {
        Ok(track) => Ok((track.display_name(), track.points)),
        Err(CliError::Json { .. }) => {
            let points = read_json::<Vec<GeoPoint>>(file)?;
            Ok((file.display().to_string(), points))
        }
        Err(e) => Err(e),
    }
}
