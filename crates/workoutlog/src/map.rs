//! Map display abstraction.
//!
//! The interactive map is an external collaborator. The session only needs
//! to center it, pin workouts to it, and pan it; tile rendering and input
//! handling belong to the host.

use std::time::Duration;

use tracing::debug;

use crate::workout::Coordinates;

/// Options for the popup attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    /// Maximum popup width in pixels.
    pub max_width: u32,
    /// Minimum popup width in pixels.
    pub min_width: u32,
    /// Close the popup when another one opens.
    pub auto_close: bool,
    /// Close the popup when the map is clicked.
    pub close_on_click: bool,
    /// Style class, e.g. `running-popup`.
    pub class_name: String,
}

/// A pinned workout on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Where the marker sits.
    pub coordinates: Coordinates,
    /// Text shown in the marker's popup.
    pub content: String,
    /// How the popup is displayed.
    pub popup: PopupOptions,
}

/// How the map moves to a new center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanOptions {
    /// Animate the transition.
    pub animate: bool,
    /// Length of the pan animation.
    pub duration: Duration,
}

impl PanOptions {
    /// An animated pan lasting `duration`.
    #[must_use]
    pub fn animated(duration: Duration) -> Self {
        Self {
            animate: true,
            duration,
        }
    }
}

/// The current center and zoom of a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// Center of the view.
    pub center: Coordinates,
    /// Zoom level.
    pub zoom: u8,
    /// How the view was reached, if it was panned to.
    pub pan: Option<PanOptions>,
}

/// An interactive map the session draws on.
pub trait MapDisplay {
    /// Initialize the map centered on `center`.
    fn load(&mut self, center: Coordinates, zoom: u8);

    /// Add a marker with an open popup.
    fn add_marker(&mut self, marker: Marker);

    /// Move the view to `center`.
    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: PanOptions);

    /// Remove every marker.
    fn clear_markers(&mut self);
}

/// A map that keeps its state in memory.
///
/// Used by the terminal host, which prints the resulting view, and by tests.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryMap {
    view: Option<MapView>,
    markers: Vec<Marker>,
    pans: usize,
}

impl MemoryMap {
    /// Create an unloaded map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current view, if the map was loaded.
    #[must_use]
    pub fn view(&self) -> Option<MapView> {
        self.view
    }

    /// Markers in the order they were added.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of `set_view` calls.
    #[must_use]
    pub fn pan_count(&self) -> usize {
        self.pans
    }
}

impl MapDisplay for MemoryMap {
    fn load(&mut self, center: Coordinates, zoom: u8) {
        debug!("Loading map at {center} (zoom {zoom})");
        self.view = Some(MapView {
            center,
            zoom,
            pan: None,
        });
    }

    fn add_marker(&mut self, marker: Marker) {
        debug!("Adding marker at {}", marker.coordinates);
        self.markers.push(marker);
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: PanOptions) {
        debug!("Panning map to {center} over {:?}", pan.duration);
        self.pans += 1;
        self.view = Some(MapView {
            center,
            zoom,
            pan: Some(pan),
        });
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(lat: f64) -> Marker {
        Marker {
            coordinates: Coordinates::new(lat, 0.0),
            content: "🏃‍♂️ Running on April 14".to_string(),
            popup: PopupOptions {
                max_width: 250,
                min_width: 100,
                auto_close: false,
                close_on_click: false,
                class_name: "running-popup".to_string(),
            },
        }
    }

    #[test]
    fn test_memory_map_starts_unloaded() {
        let map = MemoryMap::new();
        assert!(map.view().is_none());
        assert!(map.markers().is_empty());
        assert_eq!(map.pan_count(), 0);
    }

    #[test]
    fn test_memory_map_load() {
        let mut map = MemoryMap::new();
        map.load(Coordinates::new(51.5, -0.12), 14);

        let view = map.view().unwrap();
        assert_eq!(view.center, Coordinates::new(51.5, -0.12));
        assert_eq!(view.zoom, 14);
        assert!(view.pan.is_none());
    }

    #[test]
    fn test_memory_map_markers_are_not_deduplicated() {
        let mut map = MemoryMap::new();
        map.add_marker(marker(1.0));
        map.add_marker(marker(1.0));
        assert_eq!(map.markers().len(), 2);

        map.clear_markers();
        assert!(map.markers().is_empty());
    }

    #[test]
    fn test_memory_map_set_view() {
        let mut map = MemoryMap::new();
        map.load(Coordinates::new(0.0, 0.0), 14);
        map.set_view(
            Coordinates::new(48.85, 2.35),
            14,
            PanOptions::animated(Duration::from_secs(1)),
        );

        let view = map.view().unwrap();
        assert_eq!(view.center, Coordinates::new(48.85, 2.35));
        assert_eq!(
            view.pan,
            Some(PanOptions {
                animate: true,
                duration: Duration::from_secs(1)
            })
        );
        assert_eq!(map.pan_count(), 1);
    }
}
