//! Map markers supplied by the host.

use serde::{Deserialize, Serialize};

use super::LatLng;

/// A labelled pin on the map.
///
/// Markers have no stable identity; a marker list is always rendered in
/// full, in the given order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: LatLng,
    pub label: String,
    #[serde(default)]
    pub selected: bool,
}

impl Marker {
    pub fn new(position: LatLng, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}
