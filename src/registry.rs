//! The place registry: places, their markers and the search over them, kept in sync.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use std::time::Instant;

use oauth_credentials::Credentials;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::RegistryError;
use crate::filter;
use crate::geocode::GeocodeResult;
use crate::info;
use crate::map::{Animation, MapWidget};
use crate::mirror::MarkerMirror;
use crate::notice::{Level, Notices};
use crate::persist::{Persistence, Storage};
use crate::place::{IdAllocator, LatLng, Place, PlaceId};
use crate::store::PlaceStore;
use crate::venue::Venue;

/// Title given to a place whose address could not be resolved.
pub const UNKNOWN_TITLE: &str = "unknown";

/// An editable, searchable list of places mirrored as markers on a map.
///
/// Every mutation of the place list is followed, synchronously, by a reconciliation of
/// the markers and a recomputation of marker visibility for the current query.
pub struct Registry<M: MapWidget> {
    store: PlaceStore,
    ids: IdAllocator,
    mirror: MarkerMirror<M>,
    query: String,
    notices: Notices,
    config: Config,
    credentials_warned: bool,
    /// Place whose info window was opened on creation, and when to close it.
    preview: Option<(PlaceId, Instant)>,
}

/// Outcome of `Registry::save_editing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    Saved,
    /// The title was left empty, so the place was removed.
    Removed,
}

/// Outcome of applying an asynchronous lookup result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The place was removed before the result arrived.
    Discarded,
}

impl<M: MapWidget> Registry<M> {
    pub fn new(map: M) -> Self {
        Self::with_config(map, Config::default())
    }

    pub fn with_config(map: M, config: Config) -> Self {
        Self::with_ids(map, config, IdAllocator::new())
    }

    /// Creates a registry drawing place ids from `ids`.
    pub fn with_ids(map: M, config: Config, ids: IdAllocator) -> Self {
        Registry {
            store: PlaceStore::new(),
            ids,
            mirror: MarkerMirror::new(map),
            query: String::new(),
            notices: config.notices.into(),
            config,
            credentials_warned: false,
            preview: None,
        }
    }

    /// Creates a place at `position` and shows its marker right away.
    ///
    /// The place is untitled until a geocoding result is applied to it.
    pub fn add_place(&mut self, position: LatLng) -> PlaceId {
        let id = self.ids.allocate();
        self.store.add(Place::new(id, position));
        self.refresh();
        id
    }

    /// Handles a click on the map: adds a place at `position` and briefly shows its
    /// info window.
    ///
    /// Any open info window is closed first. The new window stays open until
    /// [`expire_preview`](Registry::expire_preview) is called once the preview time
    /// configured in `MapOptions` has elapsed.
    pub fn map_clicked(&mut self, position: LatLng) -> PlaceId {
        self.close_info_windows();
        let id = self.add_place(position);
        let deadline = Instant::now() + self.config.map.info_preview();
        if let Some((map, marker)) = self.mirror.map_and_marker(id) {
            map.animate_marker(marker, Animation::Drop);
        }
        self.open_preview(id);
        self.preview = Some((id, deadline));
        id
    }

    /// Closes the info window opened by `map_clicked` if it is due at `now`.
    ///
    /// Returns `true` if a window was closed.
    pub fn expire_preview(&mut self, now: Instant) -> bool {
        match self.preview {
            Some((id, deadline)) if deadline <= now => {
                self.preview = None;
                if let Some((map, marker)) = self.mirror.map_and_marker(id) {
                    map.close_info_window(marker);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    pub fn remove_place(&mut self, id: PlaceId) -> Result<Place, RegistryError> {
        let place = self.store.remove(id)?;
        self.refresh();
        Ok(place)
    }

    pub fn rename(&mut self, id: PlaceId, title: impl Into<String>) -> Result<(), RegistryError> {
        let title = title.into();
        self.store.update(id, |p| p.title = title)?;
        self.refresh();
        Ok(())
    }

    /// Starts editing the title of a place, remembering the current one.
    pub fn edit_place(&mut self, id: PlaceId) -> Result<(), RegistryError> {
        self.store.update(id, |p| {
            p.editing = true;
            p.previous_title = Some(p.title.clone());
        })?;
        self.refresh();
        Ok(())
    }

    /// Stops editing a place, keeping the trimmed title.
    ///
    /// A place whose title is empty after trimming is removed.
    pub fn save_editing(&mut self, id: PlaceId) -> Result<Edit, RegistryError> {
        let empty = self.store.update(id, |p| {
            p.editing = false;
            p.previous_title = None;
            let trimmed = p.title.trim();
            if trimmed.len() != p.title.len() {
                p.title = trimmed.to_owned();
            }
            p.title.is_empty()
        })?;

        if empty {
            self.remove_place(id)?;
            Ok(Edit::Removed)
        } else {
            self.refresh();
            Ok(Edit::Saved)
        }
    }

    /// Stops editing a place, restoring the title it had before.
    pub fn cancel_editing(&mut self, id: PlaceId) -> Result<(), RegistryError> {
        self.store.update(id, |p| {
            p.editing = false;
            if let Some(title) = p.previous_title.take() {
                p.title = title;
            }
        })?;
        self.refresh();
        Ok(())
    }

    /// Replaces the search query and updates marker visibility to match.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.sync_visibility();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Places matching the current query, in list order.
    pub fn search(&self) -> Vec<&Place> {
        filter::search(self.store.places(), &self.query)
    }

    pub fn unique_match(&self, text: &str) -> Option<&Place> {
        filter::unique_match(self.store.places(), text)
    }

    /// Current place titles, for use as typeahead suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        self.store.titles()
    }

    /// Jumps to the place matching the current query, if exactly one does.
    pub fn submit_query(&mut self) -> Option<PlaceId> {
        let id = self.unique_match(&self.query).map(Place::id)?;
        self.show_place(id).ok()?;
        Some(id)
    }

    /// Handles a selection in the typeahead widget like a submitted query.
    pub fn select_suggestion(&mut self, text: impl Into<String>) -> Option<PlaceId> {
        self.set_query(text);
        self.submit_query()
    }

    /// Pans to a place and opens its info window, closing any other.
    pub fn show_place(&mut self, id: PlaceId) -> Result<(), RegistryError> {
        let place = self.store.get(id).ok_or(RegistryError::UnknownPlace(id))?;
        let content = info::content(place);
        let position = place.position();

        self.close_info_windows();
        self.mirror.map_mut().pan_to(position);
        if let Some((map, marker)) = self.mirror.map_and_marker(id) {
            map.open_info_window(marker, &content);
            map.animate_marker(marker, Animation::Bounce);
        }
        Ok(())
    }

    pub fn marker_clicked(&mut self, id: PlaceId) -> Result<(), RegistryError> {
        let place = self.store.get(id).ok_or(RegistryError::UnknownPlace(id))?;
        self.mirror.map_mut().pan_to(place.position());
        Ok(())
    }

    /// Opens the info window of a place while the pointer hovers its marker.
    pub fn marker_hovered(&mut self, id: PlaceId, hovering: bool) -> Result<(), RegistryError> {
        let place = self.store.get(id).ok_or(RegistryError::UnknownPlace(id))?;
        let content = info::content(place);
        if let Some((map, marker)) = self.mirror.map_and_marker(id) {
            if hovering {
                map.open_info_window(marker, &content);
            } else {
                map.close_info_window(marker);
            }
        }
        Ok(())
    }

    pub fn close_info_windows(&mut self) {
        self.preview = None;
        self.mirror.close_info_windows();
    }

    pub fn info_window_content(&self, id: PlaceId) -> Option<String> {
        self.store.get(id).map(info::content)
    }

    /// Applies the outcome of a geocoding lookup to a place.
    ///
    /// On failure, or when nothing was found, the place is titled
    /// [`UNKNOWN_TITLE`] and a notice is shown. While the place is being edited the
    /// derived title only replaces the one `cancel_editing` would restore.
    pub fn apply_geocode<E: Display>(
        &mut self,
        id: PlaceId,
        result: Result<Vec<GeocodeResult>, E>,
    ) -> Applied {
        if !self.store.contains(id) {
            debug!(%id, "discarding geocoding result for removed place");
            return Applied::Discarded;
        }

        let first = match result {
            Ok(results) => {
                let first = results.into_iter().next();
                if first.is_none() {
                    self.notices
                        .push(Level::Warning, "No address found for this place");
                }
                first
            }
            Err(e) => {
                self.notices
                    .push(Level::Warning, format!("Geocoder failed due to: {}", e));
                None
            }
        };

        let mapping = &self.config.geocode.mapping;
        let updated = self.store.update(id, |p| {
            let title = match first {
                Some(ref r) => {
                    p.set_formatted_address(&r.formatted_address);
                    r.title(mapping)
                }
                None => None,
            }
            .unwrap_or_else(|| UNKNOWN_TITLE.to_owned());

            if p.editing {
                p.previous_title = Some(title);
            } else {
                p.title = title;
            }
        });
        debug_assert!(updated.is_ok());

        self.refresh();
        if matches!(self.preview, Some((shown, _)) if shown == id) {
            self.open_preview(id);
        }
        Applied::Updated
    }

    /// Applies the outcome of a venue search to a place.
    ///
    /// A failure is recorded in the place's `lookup_error` and leaves its venues as they
    /// were.
    pub fn apply_venues<E: Display>(
        &mut self,
        id: PlaceId,
        result: Result<Vec<Venue>, E>,
    ) -> Applied {
        if !self.store.contains(id) {
            debug!(%id, "discarding venue result for removed place");
            return Applied::Discarded;
        }

        let outcome = match result {
            Ok(venues) => Ok(venues.iter().map(Venue::summary).collect::<Vec<_>>()),
            Err(e) => {
                let message = e.to_string();
                self.notices
                    .push(Level::Warning, format!("Venue lookup failed: {}", message));
                Err(message)
            }
        };
        let updated = self.store.update(id, |p| match outcome {
            Ok(venues) => {
                p.venues = venues;
                p.lookup_error = None;
            }
            Err(message) => p.lookup_error = Some(message),
        });
        debug_assert!(updated.is_ok());

        self.refresh();
        if matches!(self.preview, Some((shown, _)) if shown == id) {
            self.open_preview(id);
        }
        Applied::Updated
    }

    /// The venue API credentials, if configured.
    ///
    /// The first time they are found missing a warning notice is shown; no venue lookup
    /// should be made in that case.
    pub fn venue_credentials(&mut self) -> Option<Credentials<String>> {
        match self.config.venue.credentials() {
            Some(c) => Some(Credentials::new(c.identifier().to_owned(), c.secret().to_owned())),
            None => {
                if !self.credentials_warned {
                    self.credentials_warned = true;
                    self.notices.push(
                        Level::Warning,
                        "No venue API credentials configured, nearby venues will not be shown",
                    );
                }
                None
            }
        }
    }

    /// Adds the places saved in `persistence`, returning how many were restored.
    ///
    /// A saved map centre replaces `config().map.center`, so the host can open the map
    /// where it was left.
    ///
    /// Places whose id is already in use, or which leave no room for later ids, are
    /// skipped.
    pub fn restore<S: Storage>(&mut self, persistence: &Persistence<S>) -> usize {
        if let Some(center) = persistence.load_center() {
            self.config.map.center = center;
        }
        let places = persistence.load_places().unwrap_or_default();
        let mut restored = 0;
        for mut place in places {
            if self.store.contains(place.id()) {
                continue;
            }
            if !self.ids.advance_past(place.id()) {
                warn!(id = %place.id(), "ignoring stored place with exhausted id");
                continue;
            }
            place.editing = false;
            self.store.add(place);
            restored += 1;
        }
        if restored > 0 {
            debug!(restored, "restored places");
            self.refresh();
        }
        restored
    }

    /// Saves the place list to `persistence` now and after every change.
    pub fn persist_to<S: Storage + 'static>(&mut self, persistence: Rc<RefCell<Persistence<S>>>) {
        persistence.borrow_mut().save_places(self.store.places());
        self.store
            .subscribe(move |places| persistence.borrow_mut().save_places(places));
    }

    /// Registers a callback run with the full place list after every change.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&[Place]) + 'static,
    {
        self.store.subscribe(callback);
    }

    pub fn places(&self) -> &[Place] {
        self.store.places()
    }

    pub fn get(&self, id: PlaceId) -> Option<&Place> {
        self.store.get(id)
    }

    pub fn mirror(&self) -> &MarkerMirror<M> {
        &self.mirror
    }

    pub fn map(&self) -> &M {
        self.mirror.map()
    }

    pub fn map_mut(&mut self) -> &mut M {
        self.mirror.map_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Reopens the preview window of `id` with up to date content.
    fn open_preview(&mut self, id: PlaceId) {
        let content = match self.store.get(id) {
            Some(place) => info::content(place),
            None => return,
        };
        if let Some((map, marker)) = self.mirror.map_and_marker(id) {
            map.open_info_window(marker, &content);
        }
    }

    fn refresh(&mut self) {
        self.mirror.reconcile(self.store.places());
        self.sync_visibility();
    }

    fn sync_visibility(&mut self) {
        let flags = filter::visibility(self.store.places(), &self.query);
        self.mirror.apply_visibility(flags);
    }
}
