//! View ownership between the host and the rendering surface.
//!
//! Two modes decide who is authoritative for the visible center and zoom:
//!
//! - [`ViewMode::Locked`]: the host. Every host-supplied view is pushed
//!   onto the surface; user gestures are left alone until the next host
//!   update overrides them, and one-shot pan requests are ignored.
//! - [`ViewMode::Free`]: the surface. The host view seeds the surface once
//!   at mount. Afterwards every completed gesture is reported upstream as a
//!   [`ViewChange`] and one-shot pan requests are honored.
//!
//! Each mode is its own binding type; [`ViewStateBinder`] selects one and
//! supports switching at runtime.

use std::fmt;

use tracing::debug;

use crate::model::{LatLng, ViewState};

use super::surface::{RenderSurface, SurfaceEvent};

/// Who owns the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Locked,
    Free,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Locked => write!(f, "locked"),
            ViewMode::Free => write!(f, "free"),
        }
    }
}

/// Upstream notification of a completed user gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    /// Pan finished at this center.
    Moved(LatLng),
    /// Zoom finished at this level.
    Zoomed(u8),
}

/// Host-authoritative binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockedBinding;

impl LockedBinding {
    fn apply_host_view<S: RenderSurface + ?Sized>(&self, surface: &mut S, view: &ViewState) {
        if surface.center() != view.center {
            surface.pan_to(view.center);
        }
        if surface.zoom() != view.zoom {
            surface.set_zoom(view.zoom);
        }
    }
}

/// Surface-authoritative binding.
#[derive(Debug, Clone, Copy)]
pub struct FreeBinding {
    seed: ViewState,
}

impl FreeBinding {
    pub fn new(seed: ViewState) -> Self {
        Self { seed }
    }

    /// The view captured when this binding was created.
    pub fn seed(&self) -> &ViewState {
        &self.seed
    }

    fn on_surface_event<S: RenderSurface + ?Sized>(
        &self,
        surface: &S,
        event: SurfaceEvent,
    ) -> ViewChange {
        match event {
            SurfaceEvent::MoveEnd => ViewChange::Moved(surface.center()),
            SurfaceEvent::ZoomEnd => ViewChange::Zoomed(surface.zoom()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Binding {
    Locked(LockedBinding),
    Free(FreeBinding),
}

/// Reconciles host view state with the surface under the active mode.
#[derive(Debug, Clone)]
pub struct ViewStateBinder {
    binding: Binding,
    /// Latest view the host supplied, whatever the mode.
    host_view: ViewState,
}

impl ViewStateBinder {
    pub fn new(mode: ViewMode, host_view: ViewState) -> Self {
        let binding = match mode {
            ViewMode::Locked => Binding::Locked(LockedBinding),
            ViewMode::Free => Binding::Free(FreeBinding::new(host_view)),
        };
        Self { binding, host_view }
    }

    pub fn mode(&self) -> ViewMode {
        match self.binding {
            Binding::Locked(_) => ViewMode::Locked,
            Binding::Free(_) => ViewMode::Free,
        }
    }

    /// Latest host-supplied view.
    pub fn host_view(&self) -> &ViewState {
        &self.host_view
    }

    /// Center and zoom the surface should be attached with.
    pub fn mount_view(&self) -> (LatLng, u8) {
        match &self.binding {
            Binding::Locked(_) => (self.host_view.center, self.host_view.zoom),
            Binding::Free(free) => (free.seed.center, free.seed.zoom),
        }
    }

    /// Record a host view and, when Locked, push it onto the surface.
    pub fn apply_host_view<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, view: ViewState) {
        self.host_view = view;
        match &self.binding {
            Binding::Locked(locked) => locked.apply_host_view(surface, &view),
            Binding::Free(_) => {
                debug!(center = %view.center, zoom = view.zoom, "Host view ignored in free mode");
            }
        }
    }

    /// One-shot recenter. Returns whether the surface moved.
    pub fn pan_to<S: RenderSurface + ?Sized>(&self, surface: &mut S, point: LatLng) -> bool {
        match self.binding {
            Binding::Locked(_) => {
                debug!(target_point = %point, "Pan request suppressed in locked mode");
                false
            }
            Binding::Free(_) => {
                surface.pan_to(point);
                true
            }
        }
    }

    /// Called after the active tile layer changed.
    ///
    /// A layer swap can move the surface's reported viewport, so Locked
    /// mode restores the host view. Free mode leaves the surface alone.
    pub fn after_layer_swap<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        if let Binding::Locked(_) = self.binding {
            surface.set_view(self.host_view.center, self.host_view.zoom);
        }
    }

    /// Translate a surface event into an upstream notification, if any.
    pub fn on_surface_event<S: RenderSurface + ?Sized>(
        &self,
        surface: &S,
        event: SurfaceEvent,
    ) -> Option<ViewChange> {
        match &self.binding {
            Binding::Locked(_) => None,
            Binding::Free(free) => Some(free.on_surface_event(surface, event)),
        }
    }

    /// Change mode at runtime.
    ///
    /// Entering Free re-seeds from the surface's current viewport. Entering
    /// Locked immediately applies the last host view.
    pub fn switch_mode<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, mode: ViewMode) {
        if mode == self.mode() {
            return;
        }
        debug!(from = %self.mode(), to = %mode, "Switching view mode");
        match mode {
            ViewMode::Free => {
                let seed = ViewState::new(surface.center(), surface.zoom(), self.host_view.layer);
                self.binding = Binding::Free(FreeBinding::new(seed));
            }
            ViewMode::Locked => {
                let locked = LockedBinding;
                locked.apply_host_view(surface, &self.host_view);
                self.binding = Binding::Locked(locked);
            }
        }
    }
}
