//! Continuous position capability.
//!
//! A [`PositionSource`] hands out a stream of [`PositionUpdate`]s, one per
//! fix or error, the way a device geolocation watch does. Two sources ship
//! with the crate:
//!
//! - [`ChannelPositionSource`]: fed by the host through a channel sender
//! - [`ReplayPositionSource`]: replays a recorded list of fixes

use std::pin::Pin;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::model::{GeoPoint, LatLng};

/// Errors from the position capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// No continuous position capability is available.
    #[error("position capability unavailable: {0}")]
    Unavailable(String),

    /// The user or platform refused access.
    #[error("position permission denied")]
    PermissionDenied,

    /// The platform gave up waiting for a fix.
    #[error("position request timed out")]
    Timeout,
}

/// One reading from the position capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Capture time, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl PositionFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            speed: None,
            altitude: None,
            heading: None,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Convert to a [`GeoPoint`], using `fallback` when the fix carries no
    /// timestamp.
    pub fn to_point(&self, fallback: DateTime<Utc>) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.timestamp.unwrap_or(fallback),
            altitude: self.altitude,
            speed: self.speed,
            accuracy: self.accuracy,
            heading: self.heading,
        }
    }
}

/// An event on a position stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Fix(PositionFix),
    /// The watch failed; no further fixes follow.
    Error(PositionError),
}

/// Stream of updates from one watch.
pub type PositionStream = Pin<Box<dyn Stream<Item = PositionUpdate> + Send>>;

/// A capability that delivers continuous position updates.
pub trait PositionSource: Send + Sync {
    /// Begin watching. Dropping the stream cancels the watch.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if watching cannot begin.
    fn watch(&self) -> Result<PositionStream, PositionError>;
}

/// Source fed by the host through an unbounded channel.
///
/// Only one watch can be taken; later calls report the capability as
/// unavailable.
pub struct ChannelPositionSource {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<PositionUpdate>>>,
}

impl ChannelPositionSource {
    pub fn new() -> (Self, mpsc::UnboundedSender<PositionUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            receiver: Mutex::new(Some(rx)),
        };
        (source, tx)
    }
}

impl PositionSource for ChannelPositionSource {
    fn watch(&self) -> Result<PositionStream, PositionError> {
        let rx = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| PositionError::Unavailable("channel already watched".to_string()))?;
        Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|update| (update, rx))
        })))
    }
}

/// Source that replays recorded fixes, optionally paced.
#[derive(Debug, Clone)]
pub struct ReplayPositionSource {
    fixes: Vec<PositionFix>,
    interval: Duration,
}

impl ReplayPositionSource {
    pub fn new(fixes: Vec<PositionFix>) -> Self {
        Self {
            fixes,
            interval: Duration::ZERO,
        }
    }

    /// Delay before each fix.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }
}

impl PositionSource for ReplayPositionSource {
    fn watch(&self) -> Result<PositionStream, PositionError> {
        if self.fixes.is_empty() {
            return Err(PositionError::Unavailable("no recorded fixes".to_string()));
        }
        let interval = self.interval;
        let fixes = self.fixes.clone().into_iter();
        Ok(Box::pin(stream::unfold(fixes, move |mut fixes| async move {
            let fix = fixes.next()?;
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
            Some((PositionUpdate::Fix(fix), fixes))
        })))
    }
}
