//! Map view synchronization.
//!
//! This module keeps a stateful rendering surface in step with
//! host-supplied view state and overlay data.
//!
//! # Architecture
//!
//! ```text
//! host ──ViewState/track/markers──► MapViewController ──► RenderSurface
//!                                    │    │                  │
//!                                    │    ├─ ViewStateBinder (Locked | Free)
//!                                    │    └─ MarkerOverlayReconciler
//!  ◄──────────── ViewChange ─────────┘◄──────── SurfaceEvent ┘
//! ```
//!
//! - [`surface`]: the capability trait the controller draws through
//! - [`tiles`]: base and satellite tile layer descriptions, tile math
//! - [`markers`]: marker icons and full-replace reconciliation
//! - [`binder`]: Locked/Free view ownership
//! - [`controller`]: lifecycle and overlay ownership

pub mod binder;
pub mod controller;
pub mod markers;
pub mod surface;
pub mod tiles;

pub use binder::{FreeBinding, LockedBinding, ViewChange, ViewMode, ViewStateBinder};
pub use controller::MapViewController;
pub use markers::{IconSpec, MarkerIcon, MarkerOverlayReconciler};
pub use surface::{
    LayerHandle, PolylineStyle, RenderSurface, SurfaceError, SurfaceEvent, TRACK_POLYLINE_STYLE,
};
pub use tiles::{to_tile_coords, tile_origin, TileCoord, TileError, TileLayerSpec};

#[cfg(test)]
pub use surface::tests::RecordingSurface;

/// Errors from [`MapViewController`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The surface could not be attached.
    #[error("map initialization failed: {0}")]
    Initialization(#[from] SurfaceError),

    /// The controller has not been initialized yet.
    #[error("map is not initialized")]
    NotInitialized,

    /// The controller was disposed.
    #[error("map has been disposed")]
    Disposed,
}
