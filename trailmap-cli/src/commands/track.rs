//! Track commands - read tracks from the data service.

use trailmap::analytics::{DashboardStats, TrackSummary};
use trailmap::model::TrackId;

use super::common::print_summary;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Fetch one track and print its summary.
pub fn run(id: i64) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("track");
    let service = runner.create_service()?;

    let track = runner.runtime().block_on(service.get_track(TrackId(id)))?;

    println!("{} (#{})", track.display_name(), track.id);
    if let Some(description) = &track.description {
        println!("  {}", description);
    }
    if let Some(created) = track.created_at {
        println!("  Recorded {}", created.format("%Y-%m-%d %H:%M"));
    }
    print_summary(&TrackSummary::from_points(&track.points));
    Ok(())
}

/// List every track with totals.
pub fn run_list() -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("tracks");
    let service = runner.create_service()?;

    let tracks = runner.runtime().block_on(service.list_tracks())?;
    if tracks.is_empty() {
        println!("No tracks.");
        return Ok(());
    }

    for track in &tracks {
        let summary = TrackSummary::from_points(&track.points);
        println!(
            "{:>6}  {:<32}  {:>8.2} km  {:>5} min",
            track.id,
            track.display_name(),
            summary.distance_km(),
            summary.duration_minutes()
        );
    }

    let stats = DashboardStats::from_tracks(&tracks);
    println!();
    println!(
        "{} tracks, {:.2} km, {:.0} min",
        stats.total_tracks,
        stats.total_distance / 1000.0,
        stats.total_duration / 60.0
    );
    Ok(())
}
