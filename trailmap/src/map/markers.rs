//! Marker icons and the marker overlay.

use tracing::debug;

use crate::model::Marker;

use super::surface::{LayerHandle, RenderSurface};

const SHADOW_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/images/marker-shadow.png";

/// Icon variant for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// Blue pin.
    Default,
    /// Red pin.
    Selected,
}

/// Image and geometry for a marker icon, in pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSpec {
    pub icon_url: &'static str,
    pub shadow_url: &'static str,
    pub size: (u32, u32),
    pub anchor: (i32, i32),
    pub popup_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

impl MarkerIcon {
    /// Pick the icon for a marker. Depends only on its selection flag.
    pub fn for_marker(marker: &Marker) -> Self {
        if marker.selected {
            MarkerIcon::Selected
        } else {
            MarkerIcon::Default
        }
    }

    pub fn spec(&self) -> IconSpec {
        let icon_url = match self {
            MarkerIcon::Default => {
                "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-blue.png"
            }
            MarkerIcon::Selected => {
                "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-red.png"
            }
        };
        IconSpec {
            icon_url,
            shadow_url: SHADOW_URL,
            size: (25, 41),
            anchor: (12, 41),
            popup_anchor: (1, -34),
            shadow_size: (41, 41),
        }
    }
}

/// Keeps the rendered marker set equal to the most recent input.
///
/// Every reconcile clears the group and re-adds the markers in input order,
/// so nothing from an earlier call can linger.
#[derive(Debug)]
pub struct MarkerOverlayReconciler {
    group: LayerHandle,
    rendered: usize,
}

impl MarkerOverlayReconciler {
    /// Create the marker group on `surface`.
    pub fn new<S: RenderSurface + ?Sized>(surface: &mut S) -> Self {
        Self {
            group: surface.create_layer_group(),
            rendered: 0,
        }
    }

    pub fn reconcile<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, markers: &[Marker]) {
        surface.clear_group(self.group);
        for marker in markers {
            surface.add_marker(self.group, marker, MarkerIcon::for_marker(marker));
        }
        debug!(previous = self.rendered, current = markers.len(), "Markers reconciled");
        self.rendered = markers.len();
    }

    /// Number of markers currently rendered.
    pub fn len(&self) -> usize {
        self.rendered
    }

    pub fn is_empty(&self) -> bool {
        self.rendered == 0
    }

    /// Clear and destroy the group.
    pub fn remove<S: RenderSurface + ?Sized>(self, surface: &mut S) {
        surface.clear_group(self.group);
        surface.remove_layer(self.group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::surface::tests::{RecordingSurface, SurfaceCall};
    use crate::model::LatLng;

    fn marker(label: &str, selected: bool) -> Marker {
        Marker::new(LatLng::new(55.0, 37.0), label).selected(selected)
    }

    #[test]
    fn test_icon_depends_only_on_selection() {
        assert_eq!(MarkerIcon::for_marker(&marker("a", true)), MarkerIcon::Selected);
        assert_eq!(MarkerIcon::for_marker(&marker("a", false)), MarkerIcon::Default);
        assert_eq!(MarkerIcon::for_marker(&marker("b", false)), MarkerIcon::Default);
    }

    #[test]
    fn test_icon_geometry() {
        let spec = MarkerIcon::Selected.spec();
        assert!(spec.icon_url.ends_with("red.png"));
        assert_eq!(spec.size, (25, 41));
        assert_eq!(spec.anchor, (12, 41));
        assert!(MarkerIcon::Default.spec().icon_url.ends_with("blue.png"));
    }

    #[test]
    fn test_reconcile_replaces_previous_set() {
        let mut surface = RecordingSurface::new();
        let mut overlay = MarkerOverlayReconciler::new(&mut surface);

        overlay.reconcile(
            &mut surface,
            &[marker("a", false), marker("b", true), marker("c", false)],
        );
        assert_eq!(surface.marker_count(), 3);

        overlay.reconcile(&mut surface, &[marker("d", true)]);
        assert_eq!(surface.marker_count(), 1);
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_reconcile_preserves_input_order_and_icons() {
        let mut surface = RecordingSurface::new();
        let mut overlay = MarkerOverlayReconciler::new(&mut surface);
        overlay.reconcile(&mut surface, &[marker("first", true), marker("second", false)]);

        let added: Vec<_> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::AddMarker(label, icon) => Some((label.as_str(), *icon)),
                _ => None,
            })
            .collect();
        assert_eq!(
            added,
            vec![("first", MarkerIcon::Selected), ("second", MarkerIcon::Default)]
        );
    }

    #[test]
    fn test_empty_input_clears_group() {
        let mut surface = RecordingSurface::new();
        let mut overlay = MarkerOverlayReconciler::new(&mut surface);
        overlay.reconcile(&mut surface, &[marker("a", false)]);
        overlay.reconcile(&mut surface, &[]);
        assert_eq!(surface.marker_count(), 0);
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_remove_destroys_group() {
        let mut surface = RecordingSurface::new();
        let overlay = MarkerOverlayReconciler::new(&mut surface);
        overlay.remove(&mut surface);
        assert!(surface.groups.is_empty());
    }
}
