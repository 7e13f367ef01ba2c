//! Saving places and the map view across sessions.

use std::collections::HashMap;

use tracing::warn;

use crate::place::{LatLng, Place};

const PLACES_KEY: &str = "places";
const CENTER_KEY: &str = "mapCenter";

/// A string key/value store, like a browser's local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// A `Storage` kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

/// Reads and writes registry state to an optional `Storage`.
///
/// When no storage is available every operation silently does nothing.
///
/// The place list is saved by `Registry::persist_to` and read back by
/// `Registry::restore`, which also reads the map centre. The registry does not see
/// the map being panned, so the host saves the centre with `save_center` whenever the
/// view settles.
#[derive(Clone, Debug)]
pub struct Persistence<S> {
    storage: Option<S>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }
}

impl<S: Storage> Persistence<S> {
    pub fn new(storage: S) -> Self {
        Persistence {
            storage: Some(storage),
        }
    }

    pub fn unavailable() -> Self {
        Persistence { storage: None }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    pub fn save_places(&mut self, places: &[Place]) {
        self.save(PLACES_KEY, places);
    }

    /// Loads the saved places. Missing or unreadable data loads as `None`.
    pub fn load_places(&self) -> Option<Vec<Place>> {
        self.load(PLACES_KEY)
    }

    pub fn save_center(&mut self, center: LatLng) {
        self.save(CENTER_KEY, &center);
    }

    pub fn load_center(&self) -> Option<LatLng> {
        self.load(CENTER_KEY)
    }

    pub fn storage(&self) -> Option<&S> {
        self.storage.as_ref()
    }

    fn save<T: serde::Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let storage = match self.storage {
            Some(ref mut s) => s,
            None => return,
        };
        match serde_json::to_string(value) {
            Ok(json) => storage.set(key, json),
            Err(e) => warn!(key, error = %e, "failed to serialize state"),
        }
    }

    fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.storage.as_ref()?.get(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable stored state");
                None
            }
        }
    }
}
