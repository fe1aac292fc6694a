//! Track records and track-creation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Identifier assigned to a track by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A track snapshot owned by the data service.
///
/// The service returns points under either `points` or `track_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "track_points")]
    pub points: Vec<GeoPoint>,
}

impl Track {
    /// Display name, falling back to `Track {id}` for unnamed tracks.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Track {}", self.id),
        }
    }
}

/// Name and description supplied by the host when saving a recording.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackMetadata {
    pub name: String,
    pub description: Option<String>,
}

impl TrackMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Track-creation request body (`POST tracks`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub points: Vec<GeoPoint>,
}

impl NewTrack {
    pub fn new(metadata: TrackMetadata, points: Vec<GeoPoint>) -> Self {
        Self {
            name: metadata.name,
            description: metadata.description,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_accepts_track_points_alias() {
        let json = r#"{
            "id": 3,
            "name": "Morning run",
            "track_points": [
                {"latitude": 1.0, "longitude": 2.0, "timestamp": "2024-05-01T12:00:00Z"}
            ]
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id, TrackId(3));
        assert_eq!(track.points.len(), 1);
    }

    #[test]
    fn test_display_name_fallback() {
        let track = Track {
            id: TrackId(12),
            name: None,
            description: None,
            created_at: None,
            points: Vec::new(),
        };
        assert_eq!(track.display_name(), "Track 12");
    }

    #[test]
    fn test_new_track_omits_missing_description() {
        let body = NewTrack::new(TrackMetadata::new("Walk"), Vec::new());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["name"], "Walk");
        assert!(json.get("description").is_none());
        assert_eq!(json["points"].as_array().unwrap().len(), 0);
    }
}
