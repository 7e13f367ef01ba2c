#![doc(html_root_url = "https://docs.rs/place-registry/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
# Place Registry

An editable, searchable list of places kept in sync with the markers of an interactive
map, with reverse geocoding and nearby venue lookup.

## Usage

Add `place-registry` to your dependencies in your project's `Cargo.toml`:

```toml
[dependencies]
place-registry = "0.1"
```

## Overview

The host application implements [`MapWidget`] for the map it embeds and hands it to a
[`Registry`]. From then on the registry owns the markers: every change to the place
list creates, destroys or relabels markers so that there is exactly one marker per
place, and every change to the search query shows or hides them.

```rust
use place_registry::{Animation, LatLng, MapWidget, Registry};

#[derive(Default)]
struct Map {
    markers: usize,
}

impl MapWidget for Map {
    type Marker = ();

    fn create_marker(&mut self, _: LatLng, _: &str) {
        self.markers += 1;
    }
    fn destroy_marker(&mut self, _: ()) {
        self.markers -= 1;
    }
    fn set_marker_visible(&mut self, _: &(), _: bool) {}
    fn set_marker_title(&mut self, _: &(), _: &str) {}
    fn animate_marker(&mut self, _: &(), _: Animation) {}
    fn pan_to(&mut self, _: LatLng) {}
    fn open_info_window(&mut self, _: &(), _: &str) {}
    fn close_info_window(&mut self, _: &()) {}
}

let mut registry = Registry::new(Map::default());
let home = registry.add_place(LatLng::new(53.5, 9.9));
registry.rename(home, "Elbchaussee 1").unwrap();
registry.add_place(LatLng::new(53.55, 9.99));
assert_eq!(registry.map().markers, 2);

registry.set_query("elb");
assert_eq!(registry.search().len(), 1);

registry.remove_place(home).unwrap();
assert_eq!(registry.map().markers, 1);
```

Addresses and venues are looked up asynchronously with [`lookup::annotate`], or with
[`lookup::annotate_online`] which talks to the web services over `hyper`.
*/

#[cfg(feature = "hyper")]
extern crate hyper_pkg;

pub mod config;
pub mod connectivity;
pub mod error;
pub mod filter;
pub mod geocode;
#[cfg(feature = "hyper")]
pub mod hyper;
pub mod info;
pub mod lookup;
pub mod map;
pub mod mirror;
pub mod notice;
pub mod persist;
pub mod place;
pub mod registry;
pub mod store;
pub mod venue;

mod response;
#[cfg(test)]
mod test_util;
mod util;

pub use oauth_credentials::Credentials;

pub use crate::config::Config;
pub use crate::error::{Error, RegistryError};
pub use crate::geocode::{FutureGeocode, GeocodeRequest, GeocodeResult};
pub use crate::map::{Animation, MapWidget};
pub use crate::mirror::MarkerMirror;
pub use crate::notice::{Level, Notice, Notices};
pub use crate::persist::{MemoryStorage, Persistence, Storage};
pub use crate::place::{IdAllocator, LatLng, Place, PlaceId};
pub use crate::registry::Registry;
pub use crate::store::PlaceStore;
pub use crate::venue::{FutureVenues, Venue, VenueSearch};
