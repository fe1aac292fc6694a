//! Live position tracking.
//!
//! A [`LiveTrackingSession`] watches a [`PositionSource`], appends every
//! fix to a local [`TrackingBuffer`] and fans it out to the remote sinks
//! through [`crate::dispatch`]. The buffer becomes a durable track only
//! when [`LiveTrackingSession::save`] uploads it.
//!
//! # Example
//!
//! ```ignore
//! let (source, fixes) = ChannelPositionSource::new();
//! let (mut session, mut events) =
//!     LiveTrackingSession::new(source, service, SessionConfig::default());
//!
//! session.start()?;
//! // ... fixes arrive ...
//! session.stop().await?;
//! let track = session.save(TrackMetadata::new("Evening ride")).await?;
//! ```

mod buffer;
mod session;
mod source;

pub use buffer::TrackingBuffer;
pub use session::{LiveTrackingSession, SessionConfig, MAX_TRACK_NAME_LEN, MAX_TRACK_POINTS};
pub use source::{
    ChannelPositionSource, PositionError, PositionFix, PositionSource, PositionStream,
    PositionUpdate, ReplayPositionSource,
};

use thiserror::Error;

use crate::model::GeoPoint;
use crate::service::ServiceError;

/// Notifications from a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    /// A fix was appended at `index`.
    PointRecorded { index: usize, point: GeoPoint },
    /// The watch failed; no more points will be recorded.
    WatchFailed(PositionError),
    /// The position stream finished on its own.
    WatchEnded,
}

/// Errors from [`LiveTrackingSession`] operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// `start` while a watch is active.
    #[error("tracking is already active")]
    AlreadyTracking,

    /// `stop` while idle.
    #[error("tracking is not active")]
    NotTracking,

    /// The position capability could not start.
    #[error("position tracking unavailable: {0}")]
    PositionUnavailable(#[from] PositionError),

    /// `save` with nothing recorded.
    #[error("no points recorded")]
    EmptyBuffer,

    /// Track name blank or too long.
    #[error("invalid track name {0:?}: must be 1-100 characters")]
    InvalidName(String),

    /// More points than one upload accepts.
    #[error("track has {count} points, at most {max} allowed")]
    TooManyPoints { count: usize, max: usize },

    /// A fix outside valid latitude/longitude ranges.
    #[error("invalid coordinate at point {index}: ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// The data service rejected or failed the upload.
    #[error("failed to save track: {0}")]
    Service(#[from] ServiceError),
}
