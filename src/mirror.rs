//! Map markers kept in one-to-one correspondence with the live places.

use std::collections::HashSet;
use std::fmt::{self, Debug, Formatter};

use tracing::debug;

use crate::map::MapWidget;
use crate::place::{Place, PlaceId};

/// The set of markers mirroring a `PlaceStore`.
///
/// Markers are only ever created and destroyed by [`reconcile`](MarkerMirror::reconcile).
pub struct MarkerMirror<M: MapWidget> {
    map: M,
    markers: Vec<MarkerEntry<M::Marker>>,
}

/// A marker owned by a `MarkerMirror`, with the state last pushed to the widget.
#[derive(Debug)]
struct MarkerEntry<T> {
    id: PlaceId,
    handle: T,
    label: String,
    visible: bool,
}

/// What a call to `MarkerMirror::reconcile` changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub created: Vec<PlaceId>,
    pub destroyed: Vec<PlaceId>,
}

impl<M: MapWidget> MarkerMirror<M> {
    pub fn new(map: M) -> Self {
        MarkerMirror {
            map,
            markers: Vec::new(),
        }
    }

    /// Creates and destroys markers until there is exactly one marker per place in `places`.
    ///
    /// Markers are created for new places in place order before any stale marker is
    /// destroyed. Labels of surviving markers are brought up to date with place titles.
    pub fn reconcile(&mut self, places: &[Place]) -> Reconciliation {
        let live: HashSet<PlaceId> = places.iter().map(Place::id).collect();
        let mirrored: HashSet<PlaceId> = self.markers.iter().map(|m| m.id).collect();
        let mut ret = Reconciliation::default();

        for place in places.iter().filter(|p| !mirrored.contains(&p.id())) {
            let handle = self.map.create_marker(place.position(), &place.title);
            self.markers.push(MarkerEntry {
                id: place.id(),
                handle,
                label: place.title.clone(),
                visible: true,
            });
            ret.created.push(place.id());
        }

        let (keep, stale): (Vec<_>, Vec<_>) = self
            .markers
            .drain(..)
            .partition(|m| live.contains(&m.id));
        self.markers = keep;
        for marker in stale {
            ret.destroyed.push(marker.id);
            self.map.destroy_marker(marker.handle);
        }

        for place in places {
            if let Some(marker) = self.markers.iter_mut().find(|m| m.id == place.id()) {
                if marker.label != place.title {
                    self.map.set_marker_title(&marker.handle, &place.title);
                    marker.label.clone_from(&place.title);
                }
            }
        }

        if !ret.created.is_empty() || !ret.destroyed.is_empty() {
            debug!(
                created = ret.created.len(),
                destroyed = ret.destroyed.len(),
                "reconciled markers"
            );
        }
        ret
    }

    /// Applies visibility flags to markers, returning the number of ids that had no marker.
    ///
    /// The widget is only called for markers whose visibility actually changes.
    pub fn apply_visibility<I>(&mut self, flags: I) -> usize
    where
        I: IntoIterator<Item = (PlaceId, bool)>,
    {
        let mut missing = 0;
        for (id, visible) in flags {
            match self.markers.iter_mut().find(|m| m.id == id) {
                Some(marker) => {
                    if marker.visible != visible {
                        self.map.set_marker_visible(&marker.handle, visible);
                        marker.visible = visible;
                    }
                }
                None => missing += 1,
            }
        }
        if missing > 0 {
            debug!(missing, "skipped visibility of unmirrored places");
        }
        missing
    }

    /// Closes the info windows of all markers.
    pub fn close_info_windows(&mut self) {
        for marker in &self.markers {
            self.map.close_info_window(&marker.handle);
        }
    }

    pub fn marker(&self, id: PlaceId) -> Option<&M::Marker> {
        self.entry(id).map(|m| &m.handle)
    }

    pub fn is_visible(&self, id: PlaceId) -> Option<bool> {
        self.entry(id).map(|m| m.visible)
    }

    pub fn ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.markers.iter().map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Splits `self` into the widget and the handle of the marker mirroring `id`.
    pub(crate) fn map_and_marker(&mut self, id: PlaceId) -> Option<(&mut M, &M::Marker)> {
        let map = &mut self.map;
        self.markers
            .iter()
            .find(|m| m.id == id)
            .map(|m| (map, &m.handle))
    }

    fn entry(&self, id: PlaceId) -> Option<&MarkerEntry<M::Marker>> {
        self.markers.iter().find(|m| m.id == id)
    }
}

impl<M> Debug for MarkerMirror<M>
where
    M: MapWidget + Debug,
    M::Marker: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerMirror")
            .field("map", &self.map)
            .field("markers", &self.markers)
            .finish()
    }
}
