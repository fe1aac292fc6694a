//! Local record of a tracking session.
//!
//! Fixes are kept exactly as they arrived, oldest first. The buffer never
//! reorders, drops or rewrites entries; a session only appends to it and
//! hands out copies.

use chrono::{DateTime, Duration, Utc};

use super::source::PositionFix;
use crate::model::{GeoPoint, LatLng};

/// Append-only, arrival-ordered list of fixes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingBuffer {
    fixes: Vec<PositionFix>,
}

impl TrackingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fix: PositionFix) {
        self.fixes.push(fix);
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn clear(&mut self) {
        self.fixes.clear();
    }

    pub fn fixes(&self) -> &[PositionFix] {
        &self.fixes
    }

    /// Most recent fix.
    pub fn last(&self) -> Option<&PositionFix> {
        self.fixes.last()
    }

    /// Positions in arrival order, ready to draw as a polyline.
    pub fn path(&self) -> Vec<LatLng> {
        self.fixes.iter().map(PositionFix::position).collect()
    }

    /// Convert to points, synthesizing missing timestamps.
    ///
    /// A fix without its own timestamp at index `i` of `n` is stamped
    /// `now - (n - i)` seconds, so synthesized stamps stay one second apart
    /// and strictly before `now`.
    pub fn to_points(&self, now: DateTime<Utc>) -> Vec<GeoPoint> {
        let n = self.fixes.len() as i64;
        self.fixes
            .iter()
            .enumerate()
            .map(|(i, fix)| fix.to_point(now - Duration::seconds(n - i as i64)))
            .collect()
    }
}

impl FromIterator<PositionFix> for TrackingBuffer {
    fn from_iter<I: IntoIterator<Item = PositionFix>>(iter: I) -> Self {
        Self {
            fixes: iter.into_iter().collect(),
        }
    }
}
