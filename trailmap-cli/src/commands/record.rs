//! Record command - replay recorded fixes through a live tracking session.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use trailmap::analytics::TrackSummary;
use trailmap::dispatch::DispatchSnapshot;
use trailmap::model::{GeoPoint, Track, TrackMetadata};
use trailmap::tracking::{
    LiveTrackingSession, PositionFix, PositionSource, ReplayPositionSource, TrackingError,
    TrackingEvent,
};

use super::common::{print_summary, read_json};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the record command.
pub struct RecordArgs {
    pub file: PathBuf,
    pub name: String,
    pub description: Option<String>,
    pub interval_ms: u64,
    pub dry_run: bool,
}

/// Run the record command.
pub fn run(args: RecordArgs) -> Result<(), CliError> {
    let fixes: Vec<PositionFix> = read_json(&args.file)?;

    let runner = CliRunner::new()?;
    runner.log_startup("record");
    let service = runner.create_service()?;
    let session_config = runner.config().session_config();

    let mut metadata = TrackMetadata::new(args.name);
    if let Some(description) = args.description {
        metadata = metadata.with_description(description);
    }

    println!("Trailmap Replay v{}", trailmap::VERSION);
    println!("=====================");
    println!();
    println!("Source:  {} ({} fixes)", args.file.display(), fixes.len());
    println!("Service: {}", runner.config().service.base_url);
    println!();

    let source = ReplayPositionSource::new(fixes)
        .with_interval(Duration::from_millis(args.interval_ms));

    let outcome = runner.runtime().block_on(replay(
        LiveTrackingSession::new(source, service, session_config),
        metadata,
        args.dry_run,
    ))?;

    println!("Recorded {} points", outcome.points.len());
    print_summary(&TrackSummary::from_points(&outcome.points));
    println!();
    match &outcome.saved {
        Ok(Some(track)) => println!("Saved {} (#{})", track.display_name(), track.id),
        Ok(None) => println!("Dry run: track not saved"),
        Err(_) => {}
    }
    print_dispatch(&outcome.stats);
    outcome.saved?;
    Ok(())
}

/// Result of one replayed session.
struct ReplayOutcome {
    points: Vec<GeoPoint>,
    /// The saved track, `None` on a dry run.
    saved: Result<Option<Track>, TrackingError>,
    stats: DispatchSnapshot,
}

/// Record until the source is exhausted, then save (or validate) and wait
/// for queued sink calls. The sinks are drained whether or not saving
/// succeeds.
async fn replay<P: PositionSource>(
    (mut session, mut events): (LiveTrackingSession<P>, mpsc::UnboundedReceiver<TrackingEvent>),
    metadata: TrackMetadata,
    dry_run: bool,
) -> Result<ReplayOutcome, TrackingError> {
    session.start()?;
    wait_for_end(&mut events).await;
    session.stop().await?;

    let points = session.buffer().to_points(Utc::now());
    let saved = if dry_run {
        session.validate(&metadata).map(|()| None)
    } else {
        session.save(metadata).await.map(Some)
    };
    let stats = session.shutdown().await;

    Ok(ReplayOutcome {
        points,
        saved,
        stats,
    })
}

fn print_dispatch(stats: &DispatchSnapshot) {
    println!();
    println!("Live updates");
    println!("────────────");
    println!("  Current location: {}", stats.location);
    println!("  Track points:     {}", stats.track_point);
}

/// Wait until the replay finishes or fails.
async fn wait_for_end(events: &mut mpsc::UnboundedReceiver<TrackingEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            TrackingEvent::PointRecorded { .. } => {}
            TrackingEvent::WatchFailed(e) => {
                println!("Position watch failed: {}", e);
                break;
            }
            TrackingEvent::WatchEnded => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use trailmap::model::{Location, TrackId};
    use trailmap::service::{BoxFuture, DataService, ServiceError};
    use trailmap::tracking::SessionConfig;

    /// Slow sinks, and a track endpoint that always fails.
    #[derive(Default)]
    struct RejectingService {
        sink_calls: AtomicUsize,
    }

    impl RejectingService {
        async fn slow_sink(&self) {
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.sink_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl DataService for RejectingService {
        fn list_tracks(&self) -> BoxFuture<'_, Result<Vec<Track>, ServiceError>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn get_track(&self, id: TrackId) -> BoxFuture<'_, Result<Track, ServiceError>> {
            Box::pin(async move { Err(ServiceError::NotFound(format!("track {id}"))) })
        }

        fn create_track<'a>(
            &'a self,
            _track: &'a trailmap::model::NewTrack,
        ) -> BoxFuture<'a, Result<Track, ServiceError>> {
            Box::pin(async {
                Err(ServiceError::Status {
                    status: 500,
                    url: "http://test/tracks".into(),
                })
            })
        }

        fn delete_track(&self, _id: TrackId) -> BoxFuture<'_, Result<(), ServiceError>> {
            Box::pin(async { Ok(()) })
        }

        fn list_locations(&self) -> BoxFuture<'_, Result<Vec<Location>, ServiceError>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn upsert_location<'a>(
            &'a self,
            point: &'a GeoPoint,
        ) -> BoxFuture<'a, Result<Location, ServiceError>> {
            Box::pin(async move {
                self.slow_sink().await;
                Ok(Location {
                    id: 1,
                    point: point.clone(),
                    name: None,
                    description: None,
                })
            })
        }

        fn append_track_point<'a>(
            &'a self,
            _point: &'a GeoPoint,
        ) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(async move {
                self.slow_sink().await;
                Ok(())
            })
        }
    }

    fn fixes() -> Vec<PositionFix> {
        (0..3)
            .map(|i| PositionFix::new(47.0 + i as f64 * 0.001, 8.5))
            .collect()
    }

    fn session(
        service: Arc<RejectingService>,
    ) -> (LiveTrackingSession<ReplayPositionSource>, mpsc::UnboundedReceiver<TrackingEvent>) {
        LiveTrackingSession::new(
            ReplayPositionSource::new(fixes()),
            service,
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_failed_save_still_drains_sinks() {
        let service = Arc::new(RejectingService::default());

        let outcome = replay(session(service.clone()), TrackMetadata::new("Ridge"), false)
            .await
            .unwrap();

        assert!(matches!(outcome.saved, Err(TrackingError::Service(_))));
        assert_eq!(outcome.points.len(), 3);
        assert_eq!(outcome.stats.location.delivered, 3);
        assert_eq!(outcome.stats.track_point.delivered, 3);
        assert_eq!(service.sink_calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_invalid_dry_run_still_drains_sinks() {
        let service = Arc::new(RejectingService::default());

        let outcome = replay(session(service.clone()), TrackMetadata::new("   "), true)
            .await
            .unwrap();

        assert!(matches!(outcome.saved, Err(TrackingError::InvalidName(_))));
        assert!(outcome.stats.location.pending() == 0 && outcome.stats.track_point.pending() == 0);
        assert_eq!(service.sink_calls.load(Ordering::SeqCst), 6);
    }
}
