//! Delivery counters for the outbound sinks.
//!
//! Workers bump lock-free atomic counters; readers take a
//! [`DispatchSnapshot`], a point-in-time copy.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::queue::SinkKind;

#[derive(Debug, Default)]
struct SinkCounters {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    retried: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl SinkCounters {
    fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Live counters for both sinks.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    location: SinkCounters,
    track_point: SinkCounters,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn sink(&self, kind: SinkKind) -> &SinkCounters {
        match kind {
            SinkKind::CurrentLocation => &self.location,
            SinkKind::TrackPoint => &self.track_point,
        }
    }

    /// A point was accepted into the sink's queue.
    pub fn enqueued(&self, kind: SinkKind) {
        self.sink(kind).enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// The sink acknowledged a point.
    pub fn delivered(&self, kind: SinkKind) {
        self.sink(kind).delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// A failed call is being repeated.
    pub fn retried(&self, kind: SinkKind) {
        self.sink(kind).retried.fetch_add(1, Ordering::Relaxed);
    }

    /// A point was given up on after its last attempt.
    pub fn failed(&self, kind: SinkKind) {
        self.sink(kind).failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A point never entered the queue because it was full or closed.
    pub fn dropped(&self, kind: SinkKind) {
        self.sink(kind).dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            location: self.location.snapshot(),
            track_point: self.track_point.snapshot(),
        }
    }
}

/// Counters for one sink at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkSnapshot {
    pub enqueued: u64,
    pub delivered: u64,
    pub retried: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl SinkSnapshot {
    /// Points accepted but not yet delivered or failed.
    pub fn pending(&self) -> u64 {
        self.enqueued.saturating_sub(self.delivered + self.failed)
    }

    /// Points that will never reach the sink.
    pub fn lost(&self) -> u64 {
        self.failed + self.dropped
    }
}

impl fmt::Display for SinkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} delivered, {} failed, {} dropped, {} retries",
            self.delivered, self.failed, self.dropped, self.retried
        )
    }
}

/// Counters for both sinks at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSnapshot {
    pub location: SinkSnapshot,
    pub track_point: SinkSnapshot,
}

impl DispatchSnapshot {
    pub fn sink(&self, kind: SinkKind) -> &SinkSnapshot {
        match kind {
            SinkKind::CurrentLocation => &self.location,
            SinkKind::TrackPoint => &self.track_point,
        }
    }

    /// Whether both queues have drained.
    pub fn is_idle(&self) -> bool {
        self.location.pending() == 0 && self.track_point.pending() == 0
    }
}
