//! Core data model shared by the map, analytics and tracking modules.
//!
//! All coordinates are WGS84 degrees in (latitude, longitude) order and all
//! timestamps are UTC instants, serialized as ISO-8601 on the wire.
//!
//! # Types
//!
//! - [`GeoPoint`]: a single position fix with optional sensor readings
//! - [`LatLng`]: a bare coordinate pair, used for rendering
//! - [`Track`] / [`NewTrack`]: a stored track and a track-creation request
//! - [`ViewState`] / [`LayerKind`]: the visual frame of a map
//! - [`Marker`]: a labelled map pin
//! - [`GeoBounds`]: an axis-aligned bounding box over coordinates

mod bounds;
mod marker;
mod point;
mod track;
mod view;

pub use bounds::GeoBounds;
pub use marker::Marker;
pub use point::{GeoPoint, LatLng, Location};
pub use track::{NewTrack, Track, TrackId, TrackMetadata};
pub use view::{LayerKind, ParseLayerKindError, ViewState};
