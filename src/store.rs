//! The ordered, observable collection of places.

use std::fmt::{self, Debug, Formatter};

use tracing::debug;

use crate::error::RegistryError;
use crate::place::{Place, PlaceId};

type Subscriber = Box<dyn FnMut(&[Place])>;

/// An ordered collection of `Place`s that notifies its subscribers after every mutation.
///
/// Subscribers are called synchronously, in registration order, with the full updated
/// collection.
#[derive(Default)]
pub struct PlaceStore {
    places: Vec<Place>,
    subscribers: Vec<Subscriber>,
}

impl PlaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to be called with the full collection after every
    /// `add`, `remove` and `update`.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&[Place]) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Appends `place` to the end of the collection.
    pub fn add(&mut self, place: Place) {
        debug!(id = %place.id(), "adding place");
        self.places.push(place);
        self.notify();
    }

    /// Removes the place with the given id.
    ///
    /// Fails without notifying anyone if no such place exists.
    pub fn remove(&mut self, id: PlaceId) -> Result<Place, RegistryError> {
        let i = self.position(id)?;
        debug!(%id, "removing place");
        let place = self.places.remove(i);
        self.notify();
        Ok(place)
    }

    /// Mutates the place with the given id in place and notifies subscribers.
    pub fn update<F, R>(&mut self, id: PlaceId, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&mut Place) -> R,
    {
        let i = self.position(id)?;
        let ret = f(&mut self.places[i]);
        self.notify();
        Ok(ret)
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, id: PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| p.id() == id)
    }

    pub fn contains(&self, id: PlaceId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Titles of all places in order, as offered to a typeahead widget.
    pub fn titles(&self) -> Vec<String> {
        self.places.iter().map(|p| p.title.clone()).collect()
    }

    fn position(&self, id: PlaceId) -> Result<usize, RegistryError> {
        self.places
            .iter()
            .position(|p| p.id() == id)
            .ok_or(RegistryError::UnknownPlace(id))
    }

    fn notify(&mut self) {
        let places = &self.places;
        for subscriber in &mut self.subscribers {
            subscriber(places);
        }
    }
}

impl Debug for PlaceStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceStore")
            .field("places", &self.places)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
