//! Integration tests for the map view controller.
//!
//! These tests exercise the controller against a small in-memory surface:
//! - host-owned (Locked) and surface-owned (Free) viewports
//! - layer toggling with exactly one visible tile layer
//! - track and marker overlays being replaced, never stacked
//! - disposal leaving nothing alive on the surface
//!
//! Run with: `cargo test --test map_view_integration`

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tokio::sync::mpsc::error::TryRecvError;

use trailmap::map::{
    LayerHandle, MapError, MapViewController, MarkerIcon, PolylineStyle, RenderSurface,
    SurfaceError, SurfaceEvent, TileLayerSpec, ViewChange, ViewMode,
};
use trailmap::model::{GeoBounds, LatLng, LayerKind, Marker, ViewState};

// ============================================================================
// Test Surface
// ============================================================================

/// Keeps only what is alive, the way a real widget would.
#[derive(Default)]
struct CanvasSurface {
    next: u64,
    /// Live object count at the moment of release.
    released_with: Rc<Cell<Option<usize>>>,
    center: LatLng,
    zoom: u8,
    tile_layers: HashMap<LayerHandle, LayerKind>,
    shown: HashSet<LayerHandle>,
    polylines: HashMap<LayerHandle, usize>,
    groups: HashMap<LayerHandle, Vec<(String, MarkerIcon)>>,
}

impl CanvasSurface {
    fn handle(&mut self) -> LayerHandle {
        self.next += 1;
        LayerHandle(self.next)
    }

    fn visible_kinds(&self) -> Vec<LayerKind> {
        self.shown
            .iter()
            .filter_map(|h| self.tile_layers.get(h).copied())
            .collect()
    }

    fn live_objects(&self) -> usize {
        self.tile_layers.len() + self.polylines.len() + self.groups.len()
    }

    /// A user drag that ends somewhere else.
    fn drag_to(&mut self, center: LatLng) {
        self.center = center;
    }

    fn pinch_to(&mut self, zoom: u8) {
        self.zoom = zoom;
    }
}

impl RenderSurface for CanvasSurface {
    fn attach(&mut self, center: LatLng, zoom: u8) -> Result<(), SurfaceError> {
        self.center = center;
        self.zoom = zoom;
        Ok(())
    }

    fn release(&mut self) {
        self.released_with.set(Some(self.live_objects()));
    }

    fn create_tile_layer(&mut self, spec: &TileLayerSpec) -> LayerHandle {
        let handle = self.handle();
        self.tile_layers.insert(handle, spec.kind);
        handle
    }

    fn attach_layer(&mut self, layer: LayerHandle) {
        self.shown.insert(layer);
    }

    fn detach_layer(&mut self, layer: LayerHandle) {
        self.shown.remove(&layer);
    }

    fn remove_layer(&mut self, layer: LayerHandle) {
        self.shown.remove(&layer);
        self.tile_layers.remove(&layer);
        self.polylines.remove(&layer);
        self.groups.remove(&layer);
    }

    fn add_polyline(&mut self, path: &[LatLng], _style: &PolylineStyle) -> LayerHandle {
        let handle = self.handle();
        self.polylines.insert(handle, path.len());
        handle
    }

    fn create_layer_group(&mut self) -> LayerHandle {
        let handle = self.handle();
        self.groups.insert(handle, Vec::new());
        handle
    }

    fn add_marker(&mut self, group: LayerHandle, marker: &Marker, icon: MarkerIcon) -> LayerHandle {
        let handle = self.handle();
        if let Some(markers) = self.groups.get_mut(&group) {
            markers.push((marker.label.clone(), icon));
        }
        handle
    }

    fn clear_group(&mut self, group: LayerHandle) {
        if let Some(markers) = self.groups.get_mut(&group) {
            markers.clear();
        }
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    fn pan_to(&mut self, center: LatLng) {
        self.center = center;
    }

    fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom;
    }

    fn fit_bounds(&mut self, bounds: &GeoBounds) {
        self.center = bounds.center();
        self.zoom = 15;
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Moscow city center at street level.
const MOSCOW: LatLng = LatLng {
    lat: 55.7558,
    lng: 37.6173,
};

const BERLIN: LatLng = LatLng {
    lat: 52.52,
    lng: 13.405,
};

fn seed(layer: LayerKind) -> ViewState {
    ViewState::new(MOSCOW, 13, layer)
}

fn short_path() -> Vec<LatLng> {
    vec![
        LatLng::new(55.750, 37.610),
        LatLng::new(55.752, 37.615),
        LatLng::new(55.755, 37.620),
    ]
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Locked mode: the host view is always what the surface shows, including
/// after a layer toggle, and user gestures never come back out.
#[test]
fn test_locked_map_follows_host() {
    let (mut map, mut changes) = MapViewController::new(ViewMode::Locked);
    map.initialize(CanvasSurface::default(), seed(LayerKind::Base))
        .unwrap();
    assert_eq!(map.surface().unwrap().visible_kinds(), vec![LayerKind::Base]);

    map.set_view_state(ViewState::new(BERLIN, 11, LayerKind::Satellite))
        .unwrap();
    let view = map.current_view().unwrap();
    assert_eq!(view.center, BERLIN);
    assert_eq!(view.zoom, 11);
    assert_eq!(map.surface().unwrap().visible_kinds(), vec![LayerKind::Satellite]);

    map.surface_mut().unwrap().drag_to(MOSCOW);
    map.handle_surface_event(SurfaceEvent::MoveEnd).unwrap();
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));

    // a one-shot pan cannot override the host
    assert!(!map.pan_to(MOSCOW).unwrap());
    map.set_layer(LayerKind::Base).unwrap();
    assert_eq!(map.current_view().unwrap().center, BERLIN);
}

/// Free mode: the map keeps whatever the user did and reports each
/// gesture once; host views are not forced back onto the surface.
#[test]
fn test_free_map_reports_gestures() {
    let (mut map, mut changes) = MapViewController::new(ViewMode::Free);
    map.initialize(CanvasSurface::default(), seed(LayerKind::Base))
        .unwrap();

    map.surface_mut().unwrap().drag_to(BERLIN);
    map.handle_surface_event(SurfaceEvent::MoveEnd).unwrap();
    map.surface_mut().unwrap().pinch_to(9);
    map.handle_surface_event(SurfaceEvent::ZoomEnd).unwrap();

    assert_eq!(changes.try_recv(), Ok(ViewChange::Moved(BERLIN)));
    assert_eq!(changes.try_recv(), Ok(ViewChange::Zoomed(9)));
    assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));

    // layer toggle keeps the user's viewport
    map.set_layer(LayerKind::Satellite).unwrap();
    let view = map.current_view().unwrap();
    assert_eq!(view.center, BERLIN);
    assert_eq!(view.zoom, 9);

    assert!(map.pan_to(MOSCOW).unwrap());
    assert_eq!(map.current_view().unwrap().center, MOSCOW);
}

/// Switching modes at runtime: Locked re-applies the last host view.
#[test]
fn test_mode_switch_hands_view_back_to_host() {
    let (mut map, _changes) = MapViewController::new(ViewMode::Free);
    map.initialize(CanvasSurface::default(), seed(LayerKind::Base))
        .unwrap();
    map.set_view_state(ViewState::new(BERLIN, 10, LayerKind::Base))
        .unwrap();
    map.surface_mut().unwrap().drag_to(LatLng::new(48.85, 2.35));

    map.set_mode(ViewMode::Locked).unwrap();
    assert_eq!(map.mode(), ViewMode::Locked);
    let view = map.current_view().unwrap();
    assert_eq!(view.center, BERLIN);
    assert_eq!(view.zoom, 10);
}

/// Overlays are replaced, never stacked, and the track fits the viewport.
#[test]
fn test_overlays_replace_previous_content() {
    let (mut map, _changes) = MapViewController::new(ViewMode::Free);
    map.initialize(CanvasSurface::default(), seed(LayerKind::Base))
        .unwrap();

    map.set_track(&short_path()).unwrap();
    map.set_track(&short_path()[..2]).unwrap();
    let surface = map.surface().unwrap();
    assert_eq!(surface.polylines.len(), 1);
    assert_eq!(surface.polylines.values().next(), Some(&2));
    assert_eq!(surface.zoom, 15);

    map.set_markers(&[
        Marker::new(MOSCOW, "Start"),
        Marker::new(BERLIN, "Finish").selected(true),
    ])
    .unwrap();
    map.set_markers(&[Marker::new(MOSCOW, "Only")]).unwrap();
    assert_eq!(map.marker_count(), 1);
    let surface = map.surface().unwrap();
    let group = surface.groups.values().next().unwrap();
    assert_eq!(group, &vec![("Only".to_string(), MarkerIcon::Default)]);

    map.set_track(&[]).unwrap();
    assert!(!map.has_track());
    assert!(map.surface().unwrap().polylines.is_empty());
}

/// Dispose removes everything before releasing; afterward the controller
/// refuses work.
#[test]
fn test_dispose_cleans_up() {
    let surface = CanvasSurface::default();
    let released_with = Rc::clone(&surface.released_with);
    let (mut map, _changes) = MapViewController::new(ViewMode::Locked);
    map.initialize(surface, seed(LayerKind::Satellite)).unwrap();
    map.set_track(&short_path()).unwrap();
    map.set_markers(&[Marker::new(MOSCOW, "Here")]).unwrap();
    assert_eq!(map.surface().unwrap().live_objects(), 4);

    map.dispose().unwrap();
    assert_eq!(released_with.get(), Some(0));
    assert!(map.is_disposed());
    assert_eq!(map.set_layer(LayerKind::Base), Err(MapError::Disposed));
    assert_eq!(map.dispose(), Err(MapError::Disposed));
}
