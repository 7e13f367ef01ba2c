//! The contract between the registry and the interactive map it draws on.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::place::LatLng;

/// An interactive map able to display markers and info windows.
///
/// Implemented by the host for whatever map widget it embeds. All calls are made
/// synchronously from the thread that owns the registry.
pub trait MapWidget {
    /// Opaque handle of a rendered marker.
    type Marker;

    /// Renders a new marker at `position`, labelled with `title`.
    fn create_marker(&mut self, position: LatLng, title: &str) -> Self::Marker;

    /// Detaches `marker` from the map.
    fn destroy_marker(&mut self, marker: Self::Marker);

    fn set_marker_visible(&mut self, marker: &Self::Marker, visible: bool);

    fn set_marker_title(&mut self, marker: &Self::Marker, title: &str);

    fn animate_marker(&mut self, marker: &Self::Marker, animation: Animation);

    fn pan_to(&mut self, position: LatLng);

    /// Opens the info window anchored at `marker`, showing `content` as HTML.
    fn open_info_window(&mut self, marker: &Self::Marker, content: &str);

    fn close_info_window(&mut self, marker: &Self::Marker);
}

/// A one-shot marker animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Animation {
    Bounce,
    Drop,
}

/// Initial view of the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
    /// How long the info window of a place added by a map click stays open, in
    /// milliseconds.
    pub info_preview_ms: u64,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            center: LatLng::new(53.562261, 9.961613),
            zoom: 15,
            info_preview_ms: 1500,
        }
    }
}

impl MapOptions {
    pub fn info_preview(&self) -> Duration {
        Duration::from_millis(self.info_preview_ms)
    }
}
