//! Geospatial analytics over an ordered point sequence.
//!
//! Every function here is pure and total: degenerate input (zero or one
//! point, missing sensor fields) yields a neutral value, never an error.
//!
//! # Conventions
//!
//! - Distances are meters, computed with the haversine formula on a sphere
//!   of radius [`EARTH_RADIUS_M`]. No other radius is used anywhere.
//! - Durations are seconds between the first and last timestamp.
//! - Speeds are meters per second.
//!
//! # Non-monotonic timestamps
//!
//! Points are assumed to be in capture order but this is not verified. When
//! the last timestamp precedes the first, [`duration`] clamps to zero instead
//! of returning a negative value; [`timestamps_monotonic`] lets callers detect
//! the condition.

mod summary;

pub use summary::{DashboardStats, TrackSummary};

use crate::model::{GeoPoint, LatLng};

/// Canonical mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Conversion factor from m/s to km/h.
pub const MPS_TO_KMH: f64 = 3.6;

/// Great-circle distance in meters between two coordinates.
pub fn haversine(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Total path length in meters along consecutive points.
///
/// Returns 0 for fewer than two points.
pub fn distance(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine(pair[0].position(), pair[1].position()))
        .sum()
}

/// Elapsed seconds between the first and last point.
///
/// Returns 0 for fewer than two points, and clamps to 0 when the last
/// timestamp is earlier than the first.
pub fn duration(points: &[GeoPoint]) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    let seconds = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0;
    if seconds < 0.0 {
        tracing::debug!(
            first = %first.timestamp,
            last = %last.timestamp,
            "Non-monotonic track timestamps, clamping duration to zero"
        );
        return 0.0;
    }
    seconds
}

/// Time-based average speed, `distance / duration`, in m/s.
///
/// Zero when the duration is zero.
pub fn average_speed(points: &[GeoPoint]) -> f64 {
    let secs = duration(points);
    if secs > 0.0 {
        distance(points) / secs
    } else {
        0.0
    }
}

/// Highest self-reported instantaneous speed in m/s.
///
/// This is the receiver's own speed field, not a value derived from
/// positions. Points without a speed are skipped; zero if none report one.
pub fn max_speed(points: &[GeoPoint]) -> f64 {
    points
        .iter()
        .filter_map(|p| p.speed)
        .filter(|s| s.is_finite())
        .fold(0.0, f64::max)
}

/// Sum of strictly positive altitude deltas between consecutive points.
///
/// Descents are ignored rather than subtracted. A pair contributes only when
/// both points report an altitude.
pub fn elevation_gain(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .filter_map(|pair| match (pair[0].altitude, pair[1].altitude) {
            (Some(from), Some(to)) if to > from => Some(to - from),
            _ => None,
        })
        .sum()
}

/// True when every timestamp is no earlier than its predecessor.
pub fn timestamps_monotonic(points: &[GeoPoint]) -> bool {
    points
        .windows(2)
        .all(|pair| pair[1].timestamp >= pair[0].timestamp)
}
