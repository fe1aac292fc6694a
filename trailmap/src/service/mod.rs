//! Remote data service.
//!
//! The tracking pipeline and the CLI talk to the backend through the
//! [`DataService`] trait. [`HttpDataService`] is the production
//! implementation over `reqwest`; tests substitute in-memory fakes.
//!
//! # Endpoints
//!
//! | Operation            | Request                 |
//! |----------------------|-------------------------|
//! | `list_tracks`        | `GET tracks`            |
//! | `get_track`          | `GET tracks/{id}`       |
//! | `create_track`       | `POST tracks`           |
//! | `delete_track`       | `DELETE tracks/{id}`    |
//! | `list_locations`     | `GET locations`         |
//! | `upsert_location`    | `POST locations`        |
//! | `append_track_point` | `POST track-points`     |
//!
//! Paths are relative to the configured base URL.

mod http;

pub use http::{HttpDataService, ServiceConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::model::{GeoPoint, Location, NewTrack, Track, TrackId};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors returned by a [`DataService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The client could not be built from its configuration.
    #[error("invalid service configuration: {0}")]
    Config(String),
}

impl ServiceError {
    /// Whether repeating the same request may succeed.
    ///
    /// Transport failures and 5xx/429 responses are transient; everything
    /// else will fail the same way again.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Transport(_) => true,
            ServiceError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Record-oriented access to tracks and locations.
///
/// All implementations must be `Send + Sync` so one instance can be shared
/// across the dispatch workers.
pub trait DataService: Send + Sync {
    /// All tracks, without points.
    fn list_tracks(&self) -> BoxFuture<'_, Result<Vec<Track>, ServiceError>>;

    /// One track with its ordered points.
    fn get_track(&self, id: TrackId) -> BoxFuture<'_, Result<Track, ServiceError>>;

    /// Create a track from a full point list.
    fn create_track<'a>(&'a self, track: &'a NewTrack)
        -> BoxFuture<'a, Result<Track, ServiceError>>;

    fn delete_track(&self, id: TrackId) -> BoxFuture<'_, Result<(), ServiceError>>;

    fn list_locations(&self) -> BoxFuture<'_, Result<Vec<Location>, ServiceError>>;

    /// Record `point` as the user's current location.
    fn upsert_location<'a>(
        &'a self,
        point: &'a GeoPoint,
    ) -> BoxFuture<'a, Result<Location, ServiceError>>;

    /// Append one point to the in-progress track.
    fn append_track_point<'a>(
        &'a self,
        point: &'a GeoPoint,
    ) -> BoxFuture<'a, Result<(), ServiceError>>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// In-memory service that records every call.
    ///
    /// Sink calls pop scripted results from `sink_failures` first, then
    /// succeed.
    #[derive(Default)]
    pub struct MockDataService {
        pub created: Mutex<Vec<NewTrack>>,
        pub locations: Mutex<Vec<GeoPoint>>,
        pub track_points: Mutex<Vec<GeoPoint>>,
        pub sink_failures: Mutex<VecDeque<ServiceError>>,
        pub tracks: Mutex<Vec<Track>>,
    }

    impl MockDataService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_sinks(errors: impl IntoIterator<Item = ServiceError>) -> Self {
            Self {
                sink_failures: Mutex::new(errors.into_iter().collect()),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.created.lock().len() + self.locations.lock().len() + self.track_points.lock().len()
        }

        fn scripted_failure(&self) -> Option<ServiceError> {
            self.sink_failures.lock().pop_front()
        }
    }

    impl DataService for MockDataService {
        fn list_tracks(&self) -> BoxFuture<'_, Result<Vec<Track>, ServiceError>> {
            Box::pin(async move { Ok(self.tracks.lock().clone()) })
        }

        fn get_track(&self, id: TrackId) -> BoxFuture<'_, Result<Track, ServiceError>> {
            Box::pin(async move {
                self.tracks
                    .lock()
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .ok_or_else(|| ServiceError::NotFound(format!("track {id}")))
            })
        }

        fn create_track<'a>(
            &'a self,
            track: &'a NewTrack,
        ) -> BoxFuture<'a, Result<Track, ServiceError>> {
            Box::pin(async move {
                let mut created = self.created.lock();
                created.push(track.clone());
                Ok(Track {
                    id: TrackId(created.len() as i64),
                    name: Some(track.name.clone()),
                    description: track.description.clone(),
                    created_at: Some(Utc::now()),
                    points: track.points.clone(),
                })
            })
        }

        fn delete_track(&self, id: TrackId) -> BoxFuture<'_, Result<(), ServiceError>> {
            Box::pin(async move {
                self.tracks.lock().retain(|t| t.id != id);
                Ok(())
            })
        }

        fn list_locations(&self) -> BoxFuture<'_, Result<Vec<Location>, ServiceError>> {
            Box::pin(async move { Ok(Vec::new()) })
        }

        fn upsert_location<'a>(
            &'a self,
            point: &'a GeoPoint,
        ) -> BoxFuture<'a, Result<Location, ServiceError>> {
            Box::pin(async move {
                if let Some(err) = self.scripted_failure() {
                    return Err(err);
                }
                let mut locations = self.locations.lock();
                locations.push(point.clone());
                Ok(Location {
                    id: locations.len() as i64,
                    point: point.clone(),
                    name: None,
                    description: None,
                })
            })
        }

        fn append_track_point<'a>(
            &'a self,
            point: &'a GeoPoint,
        ) -> BoxFuture<'a, Result<(), ServiceError>> {
            Box::pin(async move {
                if let Some(err) = self.scripted_failure() {
                    return Err(err);
                }
                self.track_points.lock().push(point.clone());
                Ok(())
            })
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(ServiceError::Transport("reset".into()).is_transient());
        assert!(ServiceError::Status { status: 503, url: "u".into() }.is_transient());
        assert!(ServiceError::Status { status: 429, url: "u".into() }.is_transient());
        assert!(!ServiceError::Status { status: 400, url: "u".into() }.is_transient());
        assert!(!ServiceError::NotFound("track 1".into()).is_transient());
        assert!(!ServiceError::Decode("eof".into()).is_transient());
    }

    #[tokio::test]
    async fn test_mock_get_track_not_found() {
        let service = MockDataService::new();
        let err = service.get_track(TrackId(9)).await.unwrap_err();
        assert_eq!(err, ServiceError::NotFound("track 9".into()));
    }
}
