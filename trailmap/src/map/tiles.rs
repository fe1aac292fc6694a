//! Tile layer descriptions and XYZ tile math.
//!
//! Two raster layers are available to the map: a street basemap served by
//! OpenStreetMap and a satellite basemap served by Esri's World Imagery.
//! Both use Web Mercator XYZ tiles, so a geographic point maps to the same
//! tile column/row on either; only the URL template differs.
//!
//! # URL Patterns
//!
//! - Base: `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`
//! - Satellite: `https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}`
//!
//! Note that the ArcGIS template puts the row before the column.

use std::f64::consts::PI;

use crate::model::LayerKind;

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Errors from converting a geographic position into a tile address.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TileError {
    /// Latitude outside the Web Mercator range.
    #[error("latitude {0} is outside the Web Mercator range")]
    InvalidLatitude(f64),

    /// Longitude outside -180..=180.
    #[error("longitude {0} is outside -180..=180")]
    InvalidLongitude(f64),

    /// Zoom level the layer does not serve.
    #[error("zoom {zoom} is outside {min}..={max} for the {layer} layer")]
    UnsupportedZoom {
        layer: LayerKind,
        zoom: u8,
        min: u8,
        max: u8,
    },
}

/// An XYZ tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column, west to east.
    pub x: u32,
    /// Row, north to south.
    pub y: u32,
    pub zoom: u8,
}

/// Static description of a raster tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerSpec {
    pub kind: LayerKind,
    pub url_template: &'static str,
    pub attribution: &'static str,
    /// Subdomains substituted for `{s}`; empty when the template has none.
    pub subdomains: &'static [&'static str],
    pub min_zoom: u8,
    pub max_zoom: u8,
}

const BASE_LAYER: TileLayerSpec = TileLayerSpec {
    kind: LayerKind::Base,
    url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
    attribution: "&copy; OpenStreetMap contributors",
    subdomains: &["a", "b", "c"],
    min_zoom: 0,
    max_zoom: 19,
};

const SATELLITE_LAYER: TileLayerSpec = TileLayerSpec {
    kind: LayerKind::Satellite,
    url_template:
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
    attribution: "Tiles &copy; Esri",
    subdomains: &[],
    min_zoom: 0,
    max_zoom: 19,
};

impl TileLayerSpec {
    /// The layer description for `kind`.
    pub fn for_kind(kind: LayerKind) -> &'static TileLayerSpec {
        match kind {
            LayerKind::Base => &BASE_LAYER,
            LayerKind::Satellite => &SATELLITE_LAYER,
        }
    }

    /// Build the URL of the tile at `coord`.
    ///
    /// Subdomains rotate on `(x + y)` so neighbouring tiles spread across
    /// hosts.
    pub fn url_for(&self, coord: TileCoord) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &coord.zoom.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());
        if !self.subdomains.is_empty() {
            let idx = (coord.x as usize + coord.y as usize) % self.subdomains.len();
            url = url.replace("{s}", self.subdomains[idx]);
        }
        url
    }

    /// URL of the tile covering a geographic position.
    pub fn tile_url(&self, lat: f64, lon: f64, zoom: u8) -> Result<String, TileError> {
        if zoom < self.min_zoom || zoom > self.max_zoom {
            return Err(TileError::UnsupportedZoom {
                layer: self.kind,
                zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        let coord = to_tile_coords(lat, lon, zoom)?;
        Ok(self.url_for(coord))
    }
}

/// Converts geographic coordinates to the XYZ tile containing them.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, TileError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(TileError::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(TileError::InvalidLongitude(lon));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (n as u32).saturating_sub(1);

    // lon = 180 lands one past the last column
    let x = (((lon + 180.0) / 360.0 * n) as u32).min(max_index);

    let lat_rad = lat.to_radians();
    let y = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32).min(max_index);

    Ok(TileCoord { x, y, zoom })
}

/// Northwest corner of a tile as `(lat, lon)`.
#[inline]
pub fn tile_origin(coord: TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(coord.zoom as i32);
    let lon = coord.x as f64 / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * coord.y as f64 / n)).sinh().atan().to_degrees();
    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        let tile = to_tile_coords(40.7128, -74.0060, 16).unwrap();
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        let tile = to_tile_coords(55.7558, 37.6176, 0).unwrap();
        assert_eq!((tile.x, tile.y), (0, 0));
    }

    #[test]
    fn test_antimeridian_clamps_to_last_column() {
        let tile = to_tile_coords(0.0, 180.0, 2).unwrap();
        assert_eq!(tile.x, 3);
    }

    #[test]
    fn test_invalid_latitude() {
        assert!(matches!(
            to_tile_coords(90.0, 0.0, 10),
            Err(TileError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_invalid_longitude() {
        assert!(matches!(
            to_tile_coords(0.0, -180.5, 10),
            Err(TileError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_tile_origin_contains_point() {
        let tile = to_tile_coords(40.7128, -74.0060, 12).unwrap();
        let (lat, lon) = tile_origin(tile);
        assert!(lat >= 40.7128);
        assert!(lon <= -74.0060);
    }

    #[test]
    fn test_satellite_url_is_row_before_column() {
        let spec = TileLayerSpec::for_kind(LayerKind::Satellite);
        let url = spec.url_for(TileCoord { x: 5, y: 9, zoom: 4 });
        assert_eq!(
            url,
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/4/9/5"
        );
    }

    #[test]
    fn test_base_url_rotates_subdomain() {
        let spec = TileLayerSpec::for_kind(LayerKind::Base);
        assert_eq!(
            spec.url_for(TileCoord { x: 0, y: 0, zoom: 1 }),
            "https://a.tile.openstreetmap.org/1/0/0.png"
        );
        assert_eq!(
            spec.url_for(TileCoord { x: 1, y: 0, zoom: 1 }),
            "https://b.tile.openstreetmap.org/1/1/0.png"
        );
        assert_eq!(
            spec.url_for(TileCoord { x: 1, y: 1, zoom: 1 }),
            "https://c.tile.openstreetmap.org/1/1/1.png"
        );
    }

    #[test]
    fn test_tile_url_rejects_zoom_past_max() {
        let spec = TileLayerSpec::for_kind(LayerKind::Base);
        let err = spec.tile_url(0.0, 0.0, 22).unwrap_err();
        assert!(matches!(err, TileError::UnsupportedZoom { zoom: 22, .. }));
    }

    #[test]
    fn test_for_kind_matches_kind() {
        for kind in [LayerKind::Base, LayerKind::Satellite] {
            assert_eq!(TileLayerSpec::for_kind(kind).kind, kind);
        }
    }
}
