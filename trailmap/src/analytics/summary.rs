//! Aggregated track statistics for detail pages and dashboards.

use serde::Serialize;

use super::{
    average_speed, distance, duration, elevation_gain, max_speed, timestamps_monotonic,
    MPS_TO_KMH,
};
use crate::model::{GeoBounds, GeoPoint, Track};

/// All per-track figures computed in one pass over a point sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub point_count: usize,
    /// Path length in meters.
    pub distance_m: f64,
    /// Elapsed seconds, clamped to zero for non-monotonic input.
    pub duration_s: f64,
    /// Time-based average speed in m/s.
    pub average_speed_mps: f64,
    /// Highest receiver-reported speed in m/s.
    pub max_speed_mps: f64,
    /// Cumulative ascent in meters.
    pub elevation_gain_m: f64,
    /// False when any timestamp precedes its predecessor.
    pub timestamps_monotonic: bool,
    #[serde(skip)]
    pub bounds: Option<GeoBounds>,
}

impl TrackSummary {
    pub fn from_points(points: &[GeoPoint]) -> Self {
        let positions: Vec<_> = points.iter().map(GeoPoint::position).collect();
        Self {
            point_count: points.len(),
            distance_m: distance(points),
            duration_s: duration(points),
            average_speed_mps: average_speed(points),
            max_speed_mps: max_speed(points),
            elevation_gain_m: elevation_gain(points),
            timestamps_monotonic: timestamps_monotonic(points),
            bounds: GeoBounds::from_points(&positions),
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    /// Duration rounded to whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.duration_s / 60.0).round() as i64
    }

    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_mps * MPS_TO_KMH
    }

    pub fn max_speed_kmh(&self) -> f64 {
        self.max_speed_mps * MPS_TO_KMH
    }
}

impl std::fmt::Display for TrackSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} points, {:.2} km in {} min, avg {:.1} km/h, max {:.1} km/h, +{:.0} m",
            self.point_count,
            self.distance_km(),
            self.duration_minutes(),
            self.average_speed_kmh(),
            self.max_speed_kmh(),
            self.elevation_gain_m
        )
    }
}

/// Totals across a user's tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_tracks: usize,
    pub total_distance: f64,
    pub total_duration: f64,
}

impl DashboardStats {
    pub fn from_tracks<'a, I>(tracks: I) -> Self
    where
        I: IntoIterator<Item = &'a Track>,
    {
        tracks
            .into_iter()
            .fold(Self::default(), |mut stats, track| {
                stats.total_tracks += 1;
                stats.total_distance += distance(&track.points);
                stats.total_duration += duration(&track.points);
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackId;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_points() -> Vec<GeoPoint> {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        vec![
            GeoPoint::new(0.0, 0.0, t0).with_altitude(100.0).with_speed(10.0),
            GeoPoint::new(0.0, 0.5, t0 + Duration::seconds(1800))
                .with_altitude(90.0)
                .with_speed(12.0),
            GeoPoint::new(0.0, 1.0, t0 + Duration::seconds(3600)).with_altitude(130.0),
        ]
    }

    #[test]
    fn test_summary_figures() {
        let summary = TrackSummary::from_points(&sample_points());
        assert_eq!(summary.point_count, 3);
        assert_eq!(summary.duration_s, 3600.0);
        assert_eq!(summary.duration_minutes(), 60);
        assert_eq!(summary.max_speed_mps, 12.0);
        assert_eq!(summary.elevation_gain_m, 40.0);
        assert!(summary.timestamps_monotonic);
        assert!((summary.distance_km() - 111.19).abs() < 0.6);
        // ~111 km in one hour
        assert!((summary.average_speed_kmh() - 111.19).abs() < 0.6);
    }

    #[test]
    fn test_summary_of_empty_track() {
        let summary = TrackSummary::from_points(&[]);
        assert_eq!(summary.point_count, 0);
        assert_eq!(summary.distance_m, 0.0);
        assert_eq!(summary.average_speed_mps, 0.0);
        assert!(summary.bounds.is_none());
    }

    #[test]
    fn test_summary_display() {
        let text = TrackSummary::from_points(&sample_points()).to_string();
        assert!(text.starts_with("3 points"));
        assert!(text.contains("60 min"));
    }

    #[test]
    fn test_dashboard_totals() {
        let track = |id, points| Track {
            id: TrackId(id),
            name: None,
            description: None,
            created_at: None,
            points,
        };
        let tracks = vec![track(1, sample_points()), track(2, Vec::new())];

        let stats = DashboardStats::from_tracks(&tracks);
        assert_eq!(stats.total_tracks, 2);
        assert_eq!(stats.total_duration, 3600.0);
        assert!(stats.total_distance > 100_000.0);
    }
}
