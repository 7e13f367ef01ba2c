//! The `Place` record and its identifiers.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identifier of a `Place`.
///
/// Ids are handed out by an [`IdAllocator`] and are never reused within a registry,
/// even after the place they named has been removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(u64);

/// Hands out strictly increasing `PlaceId`s.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: u64,
}

/// A coordinate pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A nearby venue as stored on a `Place`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A user-created point of interest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    id: PlaceId,
    position: LatLng,
    /// User-editable title. Drives search matching and the marker label.
    pub title: String,
    /// Components of the geocoded address, empty until the geocoder answers.
    #[serde(default)]
    pub formatted_address: Vec<String>,
    #[serde(default)]
    pub venues: Vec<VenueSummary>,
    /// Set when the last venue lookup for this place failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_error: Option<String>,
    #[serde(skip)]
    pub editing: bool,
    #[serde(skip)]
    pub previous_title: Option<String>,
}

impl PlaceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for PlaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: 1 }
    }

    pub fn allocate(&mut self) -> PlaceId {
        let id = PlaceId(self.next);
        // Unreachable in practice: `advance_past` refuses to move past `u64::MAX`.
        self.next = self.next.checked_add(1).unwrap_or(u64::MAX);
        id
    }

    /// Makes sure every id allocated from now on is greater than `id`.
    ///
    /// Returns `false`, leaving the allocator unchanged, if no id greater than `id` exists.
    pub fn advance_past(&mut self, id: PlaceId) -> bool {
        match id.0.checked_add(1) {
            Some(next) => {
                self.next = self.next.max(next);
                true
            }
            None => false,
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl Display for LatLng {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        LatLng { lat, lng }
    }
}

impl Place {
    /// Creates an untitled place. Address and venues are filled in later.
    pub fn new(id: PlaceId, position: LatLng) -> Self {
        Place {
            id,
            position,
            title: String::new(),
            formatted_address: Vec::new(),
            venues: Vec::new(),
            lookup_error: None,
            editing: false,
            previous_title: None,
        }
    }

    pub fn id(&self) -> PlaceId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Sets `formatted_address` from the comma-separated form returned by geocoders.
    pub fn set_formatted_address(&mut self, address: &str) {
        self.formatted_address = split_address(address);
    }
}

pub(crate) fn split_address(address: &str) -> Vec<String> {
    address
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

static_assertions::assert_impl_all!(Place: Send, Sync);
static_assertions::assert_impl_all!(PlaceId: Copy, Ord, std::hash::Hash);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();
        assert!(a < b && b < c);
    }

    #[test]
    fn advance_past() {
        let mut ids = IdAllocator::new();
        assert!(ids.advance_past(PlaceId(41)));
        assert_eq!(ids.allocate(), PlaceId(42));
        // Never goes backwards.
        assert!(ids.advance_past(PlaceId(3)));
        assert_eq!(ids.allocate(), PlaceId(43));
    }

    #[test]
    fn advance_past_the_last_id() {
        let mut ids = IdAllocator::new();
        assert!(!ids.advance_past(PlaceId(u64::MAX)));
        assert_eq!(ids.allocate(), PlaceId(1));
    }

    #[test]
    fn formatted_address() {
        let mut place = Place::new(PlaceId(1), LatLng::new(53.5, 9.9));
        place.set_formatted_address("Elbchaussee 1, 22763 Hamburg, Germany");
        assert_eq!(
            place.formatted_address,
            ["Elbchaussee 1", "22763 Hamburg", "Germany"]
        );
    }

    #[test]
    fn transient_fields_are_not_persisted() {
        let mut place = Place::new(PlaceId(7), LatLng::new(1.0, 2.0));
        place.title = "Home".into();
        place.editing = true;
        place.previous_title = Some("Old".into());

        let json = serde_json::to_string(&place).unwrap();
        assert!(!json.contains("editing"));
        let back: Place = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), PlaceId(7));
        assert_eq!(back.title, "Home");
        assert!(!back.editing);
        assert_eq!(back.previous_title, None);
    }
}
