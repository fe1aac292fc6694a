//! Map view state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LatLng;

/// Which background imagery a map shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Street map.
    #[default]
    Base,
    /// Aerial / satellite imagery.
    Satellite,
}

impl LayerKind {
    /// Config-file spelling of this layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Base => "base",
            LayerKind::Satellite => "satellite",
        }
    }

    /// The other layer.
    pub fn toggled(&self) -> Self {
        match self {
            LayerKind::Base => LayerKind::Satellite,
            LayerKind::Satellite => LayerKind::Base,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a layer name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown map layer '{0}' (expected 'base' or 'satellite')")]
pub struct ParseLayerKindError(pub String);

impl FromStr for LayerKind {
    type Err = ParseLayerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" | "map" | "osm" | "street" => Ok(LayerKind::Base),
            "satellite" | "sat" | "aerial" => Ok(LayerKind::Satellite),
            other => Err(ParseLayerKindError(other.to_string())),
        }
    }
}

/// The visual frame of a map: where it looks, how close, and on which imagery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: u8,
    pub layer: LayerKind,
}

impl ViewState {
    pub fn new(center: LatLng, zoom: u8, layer: LayerKind) -> Self {
        Self {
            center,
            zoom,
            layer,
        }
    }

    /// Same frame on a different layer.
    pub fn with_layer(mut self, layer: LayerKind) -> Self {
        self.layer = layer;
        self
    }

    /// True when center and zoom match, ignoring the layer.
    pub fn same_frame(&self, other: &ViewState) -> bool {
        self.center == other.center && self.zoom == other.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_kind_parsing() {
        assert_eq!("base".parse::<LayerKind>().unwrap(), LayerKind::Base);
        assert_eq!("Satellite".parse::<LayerKind>().unwrap(), LayerKind::Satellite);
        assert_eq!(" osm ".parse::<LayerKind>().unwrap(), LayerKind::Base);
        assert!("terrain".parse::<LayerKind>().is_err());
    }

    #[test]
    fn test_layer_kind_toggle() {
        assert_eq!(LayerKind::Base.toggled(), LayerKind::Satellite);
        assert_eq!(LayerKind::Satellite.toggled(), LayerKind::Base);
    }

    #[test]
    fn test_same_frame_ignores_layer() {
        let a = ViewState::new(LatLng::new(1.0, 2.0), 10, LayerKind::Base);
        let b = a.with_layer(LayerKind::Satellite);
        assert!(a.same_frame(&b));
        assert_ne!(a, b);
    }
}
