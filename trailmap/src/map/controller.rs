//! Top-level owner of a rendering surface.
//!
//! [`MapViewController`] attaches a [`RenderSurface`], installs both tile
//! layers with exactly one visible, and owns the two overlays: a single
//! track polyline and a marker group. View ownership is delegated to a
//! [`ViewStateBinder`]; user gestures surface as [`ViewChange`]s on the
//! channel returned by [`MapViewController::new`].
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Active --dispose--> Disposed
//! ```
//!
//! Every operation other than `initialize` requires `Active`. Dropping an
//! active controller tears the surface down the same way `dispose` does.
//!
//! # Example
//!
//! ```ignore
//! let (mut map, mut changes) = MapViewController::new(ViewMode::Free);
//! map.initialize(surface, ViewState::new(center, 13, LayerKind::Base))?;
//! map.set_track(&points)?;
//! map.set_markers(&markers)?;
//! map.dispose()?;
//! ```

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::model::{GeoBounds, GeoPoint, LatLng, LayerKind, Marker, ViewState};

use super::binder::{ViewChange, ViewMode, ViewStateBinder};
use super::markers::MarkerOverlayReconciler;
use super::surface::{LayerHandle, RenderSurface, SurfaceEvent, TRACK_POLYLINE_STYLE};
use super::tiles::TileLayerSpec;
use super::MapError;

struct ActiveMap<S> {
    surface: S,
    base_layer: LayerHandle,
    satellite_layer: LayerHandle,
    active_layer: LayerKind,
    polyline: Option<LayerHandle>,
    markers: Option<MarkerOverlayReconciler>,
    binder: ViewStateBinder,
}

impl<S: RenderSurface> ActiveMap<S> {
    fn layer_handle(&self, kind: LayerKind) -> LayerHandle {
        match kind {
            LayerKind::Base => self.base_layer,
            LayerKind::Satellite => self.satellite_layer,
        }
    }

    fn teardown(mut self) {
        if let Some(polyline) = self.polyline.take() {
            self.surface.remove_layer(polyline);
        }
        if let Some(markers) = self.markers.take() {
            markers.remove(&mut self.surface);
        }
        let active = self.layer_handle(self.active_layer);
        self.surface.detach_layer(active);
        self.surface.remove_layer(self.base_layer);
        self.surface.remove_layer(self.satellite_layer);
        self.surface.release();
    }
}

enum ControllerState<S> {
    Uninitialized,
    Active(Box<ActiveMap<S>>),
    Disposed,
}

/// Owns one rendering surface and everything drawn on it.
pub struct MapViewController<S: RenderSurface> {
    mode: ViewMode,
    state: ControllerState<S>,
    changes: mpsc::UnboundedSender<ViewChange>,
}

impl<S: RenderSurface> MapViewController<S> {
    /// Create an uninitialized controller and the receiver for its view
    /// change notifications.
    pub fn new(mode: ViewMode) -> (Self, mpsc::UnboundedReceiver<ViewChange>) {
        let (changes, rx) = mpsc::unbounded_channel();
        let controller = Self {
            mode,
            state: ControllerState::Uninitialized,
            changes,
        };
        (controller, rx)
    }

    /// Attach `surface` and install layers and overlays.
    ///
    /// `seed.layer` selects the visible tile layer. Calling this on an
    /// already initialized controller is a no-op and `surface` is dropped
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`MapError::Initialization`] if the surface cannot attach to its
    ///   host. The controller stays uninitialized.
    /// - [`MapError::Disposed`] after `dispose`.
    pub fn initialize(&mut self, mut surface: S, seed: ViewState) -> Result<(), MapError> {
        match self.state {
            ControllerState::Disposed => return Err(MapError::Disposed),
            ControllerState::Active(_) => {
                debug!("Map already initialized, ignoring");
                return Ok(());
            }
            ControllerState::Uninitialized => {}
        }

        let binder = ViewStateBinder::new(self.mode, seed);
        let (center, zoom) = binder.mount_view();
        surface.attach(center, zoom)?;

        let base_layer = surface.create_tile_layer(TileLayerSpec::for_kind(LayerKind::Base));
        let satellite_layer =
            surface.create_tile_layer(TileLayerSpec::for_kind(LayerKind::Satellite));
        let mut active = ActiveMap {
            surface,
            base_layer,
            satellite_layer,
            active_layer: seed.layer,
            polyline: None,
            markers: None,
            binder,
        };
        let visible = active.layer_handle(seed.layer);
        active.surface.attach_layer(visible);
        active.markers = Some(MarkerOverlayReconciler::new(&mut active.surface));

        info!(mode = %self.mode, layer = %seed.layer, center = %center, zoom, "Map initialized");
        self.state = ControllerState::Active(Box::new(active));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, ControllerState::Active(_))
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.state, ControllerState::Disposed)
    }

    /// Current view ownership mode.
    pub fn mode(&self) -> ViewMode {
        match &self.state {
            ControllerState::Active(active) => active.binder.mode(),
            _ => self.mode,
        }
    }

    fn active(&self) -> Result<&ActiveMap<S>, MapError> {
        match &self.state {
            ControllerState::Active(active) => Ok(active),
            ControllerState::Uninitialized => Err(MapError::NotInitialized),
            ControllerState::Disposed => Err(MapError::Disposed),
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveMap<S>, MapError> {
        match &mut self.state {
            ControllerState::Active(active) => Ok(active),
            ControllerState::Uninitialized => Err(MapError::NotInitialized),
            ControllerState::Disposed => Err(MapError::Disposed),
        }
    }

    /// Show `kind` and hide the other tile layer.
    pub fn set_layer(&mut self, kind: LayerKind) -> Result<(), MapError> {
        let active = self.active_mut()?;
        if active.active_layer == kind {
            return Ok(());
        }
        let previous = active.layer_handle(active.active_layer);
        let next = active.layer_handle(kind);
        active.surface.detach_layer(previous);
        active.surface.attach_layer(next);
        active.active_layer = kind;
        active.binder.after_layer_swap(&mut active.surface);
        debug!(layer = %kind, "Tile layer switched");
        Ok(())
    }

    /// Currently visible tile layer.
    pub fn layer(&self) -> Result<LayerKind, MapError> {
        Ok(self.active()?.active_layer)
    }

    /// Supply a new host view.
    ///
    /// A layer change is applied first, then the binder reconciles center
    /// and zoom according to the active mode.
    pub fn set_view_state(&mut self, view: ViewState) -> Result<(), MapError> {
        self.set_layer(view.layer)?;
        let active = self.active_mut()?;
        active.binder.apply_host_view(&mut active.surface, view);
        Ok(())
    }

    /// One-shot recenter. Returns `false` when suppressed by Locked mode.
    pub fn pan_to(&mut self, point: LatLng) -> Result<bool, MapError> {
        let active = self.active_mut()?;
        Ok(active.binder.pan_to(&mut active.surface, point))
    }

    /// Replace the track polyline.
    ///
    /// The previous polyline is always removed. Non-empty input draws a new
    /// one and fits the viewport to it; empty input leaves the viewport
    /// where it is.
    pub fn set_track(&mut self, path: &[LatLng]) -> Result<(), MapError> {
        let active = self.active_mut()?;
        if let Some(previous) = active.polyline.take() {
            active.surface.remove_layer(previous);
        }
        let Some(bounds) = GeoBounds::from_points(path) else {
            debug!("Track cleared");
            return Ok(());
        };
        let handle = active.surface.add_polyline(path, &TRACK_POLYLINE_STYLE);
        active.surface.fit_bounds(&bounds);
        active.polyline = Some(handle);
        debug!(points = path.len(), "Track drawn");
        Ok(())
    }

    /// [`set_track`](Self::set_track) over recorded points.
    pub fn set_track_points(&mut self, points: &[GeoPoint]) -> Result<(), MapError> {
        let path: Vec<LatLng> = points.iter().map(GeoPoint::position).collect();
        self.set_track(&path)
    }

    pub fn has_track(&self) -> bool {
        self.active().map(|a| a.polyline.is_some()).unwrap_or(false)
    }

    /// Replace the whole marker set.
    pub fn set_markers(&mut self, markers: &[Marker]) -> Result<(), MapError> {
        let active = self.active_mut()?;
        if let Some(overlay) = active.markers.as_mut() {
            overlay.reconcile(&mut active.surface, markers);
        }
        Ok(())
    }

    /// Number of markers currently rendered.
    pub fn marker_count(&self) -> usize {
        self.active()
            .ok()
            .and_then(|a| a.markers.as_ref())
            .map(MarkerOverlayReconciler::len)
            .unwrap_or(0)
    }

    /// Forward a completed surface gesture.
    ///
    /// In Free mode this emits one [`ViewChange`] on the notification
    /// channel. Locked mode emits nothing.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> Result<(), MapError> {
        let active = self.active()?;
        if let Some(change) = active.binder.on_surface_event(&active.surface, event) {
            if self.changes.send(change).is_err() {
                debug!(?change, "View change receiver dropped");
            }
        }
        Ok(())
    }

    /// Switch view ownership at runtime.
    pub fn set_mode(&mut self, mode: ViewMode) -> Result<(), MapError> {
        let active = self.active_mut()?;
        active.binder.switch_mode(&mut active.surface, mode);
        self.mode = mode;
        Ok(())
    }

    /// The surface's live viewport plus the visible layer.
    pub fn current_view(&self) -> Result<ViewState, MapError> {
        let active = self.active()?;
        Ok(ViewState::new(
            active.surface.center(),
            active.surface.zoom(),
            active.active_layer,
        ))
    }

    /// Borrow the surface, e.g. for host-side inspection.
    pub fn surface(&self) -> Result<&S, MapError> {
        Ok(&self.active()?.surface)
    }

    /// Mutable access to the surface, used by hosts to deliver gestures.
    pub fn surface_mut(&mut self) -> Result<&mut S, MapError> {
        Ok(&mut self.active_mut()?.surface)
    }

    /// Remove every layer and overlay and release the surface.
    ///
    /// # Errors
    ///
    /// [`MapError::Disposed`] if already disposed.
    pub fn dispose(&mut self) -> Result<(), MapError> {
        match std::mem::replace(&mut self.state, ControllerState::Disposed) {
            ControllerState::Disposed => Err(MapError::Disposed),
            ControllerState::Uninitialized => Ok(()),
            ControllerState::Active(active) => {
                (*active).teardown();
                info!("Map disposed");
                Ok(())
            }
        }
    }
}

impl<S: RenderSurface> Drop for MapViewController<S> {
    fn drop(&mut self) {
        if let ControllerState::Active(active) =
            std::mem::replace(&mut self.state, ControllerState::Disposed)
        {
            warn!("Map dropped without dispose, releasing surface");
            (*active).teardown();
        }
    }
}
