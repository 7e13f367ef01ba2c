use std::collections::BTreeMap;

use crate::map::{Animation, MapWidget};
use crate::place::LatLng;

/// Handle of a marker on a `RecordingMap`.
#[derive(Debug, PartialEq, Eq)]
pub struct Pin(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create(usize),
    Destroy(usize),
    Visible(usize, bool),
    Title(usize, String),
    Animate(usize, Animation),
    PanTo(LatLng),
    Open(usize, String),
    Close(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PinState {
    pub position: LatLng,
    pub title: String,
    pub visible: bool,
    pub info_open: bool,
}

/// A `MapWidget` that records every call and tracks the pins currently on the map.
#[derive(Debug, Default)]
pub struct RecordingMap {
    next: usize,
    pub pins: BTreeMap<usize, PinState>,
    pub calls: Vec<Call>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn pin_titled(&self, title: &str) -> Option<&PinState> {
        self.pins.values().find(|p| p.title == title)
    }
}

impl MapWidget for RecordingMap {
    type Marker = Pin;

    fn create_marker(&mut self, position: LatLng, title: &str) -> Pin {
        let n = self.next;
        self.next += 1;
        self.pins.insert(
            n,
            PinState {
                position,
                title: title.to_owned(),
                visible: true,
                info_open: false,
            },
        );
        self.calls.push(Call::Create(n));
        Pin(n)
    }

    fn destroy_marker(&mut self, marker: Pin) {
        assert!(self.pins.remove(&marker.0).is_some(), "double destroy");
        self.calls.push(Call::Destroy(marker.0));
    }

    fn set_marker_visible(&mut self, marker: &Pin, visible: bool) {
        self.pins.get_mut(&marker.0).unwrap().visible = visible;
        self.calls.push(Call::Visible(marker.0, visible));
    }

    fn set_marker_title(&mut self, marker: &Pin, title: &str) {
        self.pins.get_mut(&marker.0).unwrap().title = title.to_owned();
        self.calls.push(Call::Title(marker.0, title.to_owned()));
    }

    fn animate_marker(&mut self, marker: &Pin, animation: Animation) {
        self.calls.push(Call::Animate(marker.0, animation));
    }

    fn pan_to(&mut self, position: LatLng) {
        self.calls.push(Call::PanTo(position));
    }

    fn open_info_window(&mut self, marker: &Pin, content: &str) {
        self.pins.get_mut(&marker.0).unwrap().info_open = true;
        self.calls.push(Call::Open(marker.0, content.to_owned()));
    }

    fn close_info_window(&mut self, marker: &Pin) {
        self.pins.get_mut(&marker.0).unwrap().info_open = false;
        self.calls.push(Call::Close(marker.0));
    }
}
