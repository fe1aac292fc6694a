//! Live tracking session.
//!
//! # State machine
//!
//! ```text
//!          start()               stop()
//!   Idle ───────────► Tracking ───────────► Idle
//!    ▲                   │ stream error/end
//!    └───────────────────┘ (ingest task exits; stop() still required)
//! ```
//!
//! While tracking, each fix is appended to the local buffer first and then
//! handed to the [`OutboundDispatcher`]. The append never waits on the
//! network. `stop` cancels the position watch only; points already queued
//! for the remote sinks are still delivered.

use std::sync::Arc;

use chrono::Utc;
use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::buffer::TrackingBuffer;
use super::source::{PositionSource, PositionStream, PositionUpdate};
use super::{TrackingError, TrackingEvent};
use crate::dispatch::{DispatchConfig, DispatchMetrics, DispatchSnapshot, OutboundDispatcher};
use crate::model::{NewTrack, Track, TrackMetadata};
use crate::service::DataService;

/// Most points accepted in one saved track.
pub const MAX_TRACK_POINTS: usize = 10_000;

/// Longest accepted track name, in characters.
pub const MAX_TRACK_NAME_LEN: usize = 100;

/// Settings for a [`LiveTrackingSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub dispatch: DispatchConfig,
    pub max_points: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            max_points: MAX_TRACK_POINTS,
        }
    }
}

enum SessionState {
    Idle,
    Tracking {
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
}

/// Owns a position watch, the local buffer and the outbound fan-out.
pub struct LiveTrackingSession<P: PositionSource> {
    source: P,
    service: Arc<dyn DataService>,
    config: SessionConfig,
    buffer: Arc<Mutex<TrackingBuffer>>,
    metrics: Arc<DispatchMetrics>,
    dispatcher: Option<Arc<OutboundDispatcher>>,
    events: mpsc::UnboundedSender<TrackingEvent>,
    state: SessionState,
}

impl<P: PositionSource> LiveTrackingSession<P> {
    /// Create an idle session and the receiver for its events.
    pub fn new(
        source: P,
        service: Arc<dyn DataService>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TrackingEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let session = Self {
            source,
            service,
            config,
            buffer: Arc::new(Mutex::new(TrackingBuffer::new())),
            metrics: Arc::new(DispatchMetrics::new()),
            dispatcher: None,
            events,
            state: SessionState::Idle,
        };
        (session, rx)
    }

    /// Whether a watch is active.
    pub fn is_tracking(&self) -> bool {
        matches!(self.state, SessionState::Tracking { .. })
    }

    /// Start watching positions into an empty buffer.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::AlreadyTracking`] if a watch is active.
    /// - [`TrackingError::PositionUnavailable`] if the source cannot watch;
    ///   the session stays idle and the buffer is untouched.
    pub fn start(&mut self) -> Result<(), TrackingError> {
        if self.is_tracking() {
            return Err(TrackingError::AlreadyTracking);
        }
        let stream = self.source.watch()?;

        self.buffer.lock().clear();
        let dispatcher = self
            .dispatcher
            .get_or_insert_with(|| {
                Arc::new(OutboundDispatcher::spawn(
                    Arc::clone(&self.service),
                    self.config.dispatch.clone(),
                    Arc::clone(&self.metrics),
                ))
            })
            .clone();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(ingest(
            stream,
            Arc::clone(&self.buffer),
            dispatcher,
            self.events.clone(),
            cancel.clone(),
        ));
        self.state = SessionState::Tracking { cancel, task };
        info!("Tracking started");
        Ok(())
    }

    /// Cancel the watch. The buffer is kept.
    ///
    /// Returns once the ingest task has exited, so the buffer is final.
    pub async fn stop(&mut self) -> Result<(), TrackingError> {
        let SessionState::Tracking { cancel, task } =
            std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            return Err(TrackingError::NotTracking);
        };
        cancel.cancel();
        if let Err(e) = task.await {
            warn!(error = %e, "Ingest task ended abnormally");
        }
        info!(points = self.buffer.lock().len(), "Tracking stopped");
        Ok(())
    }

    /// A copy of the buffer.
    pub fn buffer(&self) -> TrackingBuffer {
        self.buffer.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Delivery counters for the remote sinks.
    pub fn dispatch_stats(&self) -> DispatchSnapshot {
        self.metrics.snapshot()
    }

    /// Check the buffer can be uploaded as a track.
    pub fn validate(&self, metadata: &TrackMetadata) -> Result<(), TrackingError> {
        validate_upload(&self.buffer.lock(), metadata, self.config.max_points)
    }

    /// Upload the buffer as a new track.
    ///
    /// Fixes recorded by the session carry the timestamp the remote sinks
    /// saw: their own, or their arrival time. Any fix still lacking one is
    /// stamped one second apart, ending one second before now.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any network call:
    /// [`TrackingError::EmptyBuffer`] first, then name, size and
    /// coordinate checks. Service failures are returned as
    /// [`TrackingError::Service`].
    pub async fn save(&self, metadata: TrackMetadata) -> Result<Track, TrackingError> {
        let points = {
            let buffer = self.buffer.lock();
            validate_upload(&buffer, &metadata, self.config.max_points)?;
            buffer.to_points(Utc::now())
        };
        let request = NewTrack::new(metadata, points);
        let track = self.service.create_track(&request).await?;
        info!(track_id = %track.id, points = request.points.len(), "Track saved");
        Ok(track)
    }

    /// Stop if needed, then wait for queued sink calls to finish.
    pub async fn shutdown(mut self) -> DispatchSnapshot {
        if self.is_tracking() {
            if let Err(e) = self.stop().await {
                warn!(error = %e, "Stop during shutdown failed");
            }
        }
        match self.dispatcher.take().and_then(|d| Arc::try_unwrap(d).ok()) {
            Some(dispatcher) => dispatcher.drain().await,
            None => self.metrics.snapshot(),
        }
    }
}

impl<P: PositionSource> Drop for LiveTrackingSession<P> {
    fn drop(&mut self) {
        if let SessionState::Tracking { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}

fn validate_upload(
    buffer: &TrackingBuffer,
    metadata: &TrackMetadata,
    max_points: usize,
) -> Result<(), TrackingError> {
    if buffer.is_empty() {
        return Err(TrackingError::EmptyBuffer);
    }
    let name = metadata.name.trim();
    if name.is_empty() || name.chars().count() > MAX_TRACK_NAME_LEN {
        return Err(TrackingError::InvalidName(metadata.name.clone()));
    }
    if buffer.len() > max_points {
        return Err(TrackingError::TooManyPoints {
            count: buffer.len(),
            max: max_points,
        });
    }
    for (index, fix) in buffer.fixes().iter().enumerate() {
        if !fix.position().is_valid() {
            return Err(TrackingError::InvalidCoordinate {
                index,
                latitude: fix.latitude,
                longitude: fix.longitude,
            });
        }
    }
    Ok(())
}

async fn ingest(
    mut stream: PositionStream,
    buffer: Arc<Mutex<TrackingBuffer>>,
    dispatcher: Arc<OutboundDispatcher>,
    events: mpsc::UnboundedSender<TrackingEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                // Fixes already delivered by the source still belong in the buffer.
                let mut drained = 0;
                while let Some(update) = stream.next().now_or_never() {
                    if !handle_update(update, &buffer, &dispatcher, &events) {
                        break;
                    }
                    drained += 1;
                }
                debug!(drained, "Position watch cancelled");
                break;
            }

            update = stream.next() => {
                if !handle_update(update, &buffer, &dispatcher, &events) {
                    break;
                }
            }
        }
    }
}

/// Apply one stream item. Returns `false` once the watch is over.
fn handle_update(
    update: Option<PositionUpdate>,
    buffer: &Mutex<TrackingBuffer>,
    dispatcher: &OutboundDispatcher,
    events: &mpsc::UnboundedSender<TrackingEvent>,
) -> bool {
    match update {
        Some(PositionUpdate::Fix(fix)) => {
            let now = Utc::now();
            let fix = if fix.timestamp.is_some() { fix } else { fix.at(now) };
            let point = fix.to_point(now);
            let index = {
                let mut buffer = buffer.lock();
                buffer.push(fix);
                buffer.len() - 1
            };
            dispatcher.submit(&point);
            let _ = events.send(TrackingEvent::PointRecorded { index, point });
            true
        }
        Some(PositionUpdate::Error(e)) => {
            warn!(error = %e, "Position watch failed");
            let _ = events.send(TrackingEvent::WatchFailed(e));
            false
        }
        None => {
            debug!("Position stream ended");
            let _ = events.send(TrackingEvent::WatchEnded);
            false
        }
    }
}
