//! Tile URL command - resolve the tile covering a coordinate.

use trailmap::config::ConfigFile;
use trailmap::map::{to_tile_coords, TileLayerSpec};
use trailmap::model::LayerKind;

use super::common::LayerArg;
use crate::error::CliError;

/// Run the tile-url command. Missing arguments come from the configured
/// default view.
pub fn run(
    lat: Option<f64>,
    lon: Option<f64>,
    zoom: Option<u8>,
    layer: Option<LayerArg>,
) -> Result<(), CliError> {
    let view = ConfigFile::load().unwrap_or_default().default_view();
    let lat = lat.unwrap_or(view.center.lat);
    let lon = lon.unwrap_or(view.center.lng);
    let zoom = zoom.unwrap_or(view.zoom);
    let kind = layer.map(LayerKind::from).unwrap_or(view.layer);

    let spec = TileLayerSpec::for_kind(kind);
    let coord = to_tile_coords(lat, lon, zoom)?;
    let url = spec.tile_url(lat, lon, zoom)?;

    println!("{}", url);
    println!("  Layer: {} (z{}-{})", kind, spec.min_zoom, spec.max_zoom);
    println!("  Tile:  x={} y={} z={}", coord.x, coord.y, coord.zoom);
    println!("  {}", spec.attribution);
    Ok(())
}
