//! Rendering-surface abstraction.
//!
//! The map controller never talks to a concrete map widget. It drives a
//! [`RenderSurface`], a minimal capability interface over a stateful,
//! mutable map view: layers, a viewport and overlays. A browser binding, a
//! native widget or a recording fake in tests all implement the same trait.
//!
//! # Handles
//!
//! Every layer, overlay, group and marker the surface creates is identified
//! by an opaque [`LayerHandle`]. Handles are only meaningful to the surface
//! that issued them.
//!
//! # Events
//!
//! Surfaces report completed user gestures as [`SurfaceEvent`]s. The host
//! forwards those to [`crate::map::MapViewController::handle_surface_event`],
//! which reads the resulting viewport back from the surface.

use crate::model::{GeoBounds, LatLng, Marker};

use super::markers::MarkerIcon;
use super::tiles::TileLayerSpec;

/// Opaque identifier for anything a surface renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// A completed viewport gesture on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A pan finished.
    MoveEnd,
    /// A zoom finished.
    ZoomEnd,
}

/// Stroke style for the track polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    /// CSS-style hex color.
    pub color: &'static str,
    /// Stroke width in pixels.
    pub weight: f32,
    /// Stroke opacity (0.0 - 1.0).
    pub opacity: f32,
}

/// Style used for every track polyline.
pub const TRACK_POLYLINE_STYLE: PolylineStyle = PolylineStyle {
    color: "#3B82F6",
    weight: 4.0,
    opacity: 0.8,
};

/// Errors a surface can raise while binding to its host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The host element the surface should render into does not exist.
    #[error("host element unavailable: {0}")]
    HostUnavailable(String),

    /// The surface is already bound to another controller.
    #[error("surface is already attached")]
    AlreadyAttached,
}

/// Capability interface over a stateful map view.
///
/// Implementations own the native resources; callers own the handles and
/// are responsible for removing what they created before calling
/// [`release`](Self::release).
pub trait RenderSurface {
    /// Bind the surface to its host element and show the initial viewport.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::HostUnavailable`] if there is nothing to
    /// render into.
    fn attach(&mut self, center: LatLng, zoom: u8) -> Result<(), SurfaceError>;

    /// Release all native resources. The surface is unusable afterward.
    fn release(&mut self);

    /// Install a tile layer without showing it.
    fn create_tile_layer(&mut self, spec: &TileLayerSpec) -> LayerHandle;

    /// Show a previously installed layer.
    fn attach_layer(&mut self, layer: LayerHandle);

    /// Hide a layer without destroying it.
    fn detach_layer(&mut self, layer: LayerHandle);

    /// Destroy a layer, overlay or group.
    fn remove_layer(&mut self, layer: LayerHandle);

    /// Draw a path through `path` in order. The overlay is shown immediately.
    fn add_polyline(&mut self, path: &[LatLng], style: &PolylineStyle) -> LayerHandle;

    /// Create an empty, visible marker group.
    fn create_layer_group(&mut self) -> LayerHandle;

    /// Add a marker with a popup label to `group`.
    fn add_marker(&mut self, group: LayerHandle, marker: &Marker, icon: MarkerIcon) -> LayerHandle;

    /// Remove every marker from `group`.
    fn clear_group(&mut self, group: LayerHandle);

    /// Current viewport center.
    fn center(&self) -> LatLng;

    /// Current zoom level.
    fn zoom(&self) -> u8;

    /// Jump to a center and zoom.
    fn set_view(&mut self, center: LatLng, zoom: u8);

    /// Recenter without changing zoom.
    fn pan_to(&mut self, center: LatLng);

    /// Change zoom without recentering.
    fn set_zoom(&mut self, zoom: u8);

    /// Fit the viewport to a bounding box.
    fn fit_bounds(&mut self, bounds: &GeoBounds);
}
