//! Drives the address and venue lookups of a newly added place.

use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;

use futures_util::future::join;
use oauth_credentials::Credentials;

use crate::geocode::GeocodeResult;
use crate::map::MapWidget;
use crate::place::{LatLng, PlaceId};
use crate::registry::Registry;
use crate::venue::Venue;

/// Handles a map click at `position` like `Registry::map_clicked` and annotates the
/// new place with the results of `geocode` and `venues`, returning its id.
///
/// Both lookups run concurrently. `venues` is only called when venue credentials are
/// configured. Each result is applied as soon as it arrives; if the place has been
/// removed by then it is discarded.
///
/// The registry is only borrowed for short synchronous sections, never across an
/// `.await`, so other code may use it while the lookups are in flight.
pub async fn annotate<M, G, GF, GE, V, VF, VE>(
    registry: &RefCell<Registry<M>>,
    position: LatLng,
    geocode: G,
    venues: V,
) -> PlaceId
where
    M: MapWidget,
    G: FnOnce(LatLng) -> GF,
    GF: Future<Output = Result<Vec<GeocodeResult>, GE>>,
    GE: Display,
    V: FnOnce(LatLng, Credentials<String>) -> VF,
    VF: Future<Output = Result<Vec<Venue>, VE>>,
    VE: Display,
{
    let (id, credentials) = {
        let mut registry = registry.borrow_mut();
        let id = registry.map_clicked(position);
        (id, registry.venue_credentials())
    };

    let geocoded = async move {
        let result = geocode(position).await;
        registry.borrow_mut().apply_geocode(id, result);
    };
    let searched = async move {
        if let Some(credentials) = credentials {
            let result = venues(position, credentials).await;
            registry.borrow_mut().apply_venues(id, result);
        }
    };
    join(geocoded, searched).await;

    id
}

/// Same as `annotate` except that the lookups are sent over HTTPS to the endpoints in
/// the registry's `Config`.
///
/// # Panics
///
/// This will panic if the underlying HTTPS connector failed to initialize.
#[cfg(feature = "hyper")]
#[cfg_attr(docsrs, doc(cfg(feature = "hyper")))]
pub async fn annotate_online<M: MapWidget>(
    registry: &RefCell<Registry<M>>,
    position: LatLng,
) -> PlaceId {
    use http::Uri;

    use crate::error::Error;
    use crate::venue::VenueSearch;

    let (geocode, venue) = {
        let registry = registry.borrow();
        let config = registry.config();
        (config.geocode.clone(), config.venue.clone())
    };

    let geocode = move |position: LatLng| async move {
        match geocode.request(position) {
            Ok(req) => req.send().await,
            Err(e) => Err(Error::InvalidRequest(e.into())),
        }
    };
    let venues = move |position: LatLng, credentials: Credentials<String>| async move {
        let mut search = VenueSearch::new(credentials, position);
        search.limit(venue.limit).version(&*venue.version);
        if let Some(ref endpoint) = venue.endpoint {
            match endpoint.parse::<Uri>() {
                Ok(uri) => {
                    search.endpoint(uri);
                }
                Err(e) => return Err(Error::InvalidRequest(e.into())),
            }
        }
        search.send().await
    };

    annotate(registry, position, geocode, venues).await
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future::{self, join};

    use super::*;
    use crate::config::Config;
    use crate::geocode::AddressComponent;
    use crate::registry::UNKNOWN_TITLE;
    use crate::test_util::RecordingMap;

    fn result(street: &str, number: &str) -> GeocodeResult {
        let component = |name: &str, ty: &str| AddressComponent {
            long_name: name.into(),
            short_name: name.into(),
            types: vec![ty.into()],
        };
        GeocodeResult {
            formatted_address: format!("{} {}, Hamburg", street, number),
            address_components: vec![
                component(street, "route"),
                component(number, "street_number"),
            ],
        }
    }

    fn no_venues(
        _: LatLng,
        _: Credentials<String>,
    ) -> future::Ready<Result<Vec<Venue>, Infallible>> {
        panic!("venue lookup without credentials")
    }

    #[test]
    fn annotates_new_place() {
        let mut config = Config::default();
        config.venue_credentials("id", "secret");
        let registry = RefCell::new(Registry::with_config(RecordingMap::new(), config));

        let id = block_on(annotate(
            &registry,
            LatLng::new(53.5, 9.9),
            |_| future::ready(Ok::<_, Infallible>(vec![result("Elbchaussee", "1")])),
            |_, credentials| {
                assert_eq!(credentials.identifier(), "id");
                future::ready(Ok::<_, Infallible>(vec![Venue {
                    id: "v".into(),
                    name: "Elbstrand".into(),
                    location: Default::default(),
                    categories: Vec::new(),
                }]))
            },
        ));

        let registry = registry.borrow();
        let place = registry.get(id).unwrap();
        assert_eq!(place.title, "Elbchaussee 1");
        assert_eq!(place.venues[0].name, "Elbstrand");
        assert_eq!(registry.mirror().len(), 1);
    }

    #[test]
    fn skips_venues_without_credentials() {
        let registry = RefCell::new(Registry::new(RecordingMap::new()));
        let id = block_on(annotate(
            &registry,
            LatLng::new(53.5, 9.9),
            |_| future::ready(Ok::<_, Infallible>(Vec::new())),
            no_venues,
        ));

        let registry = registry.borrow();
        assert_eq!(registry.get(id).unwrap().title, UNKNOWN_TITLE);
        assert!(registry.get(id).unwrap().venues.is_empty());
    }

    #[test]
    fn removal_while_in_flight() {
        let registry = RefCell::new(Registry::new(RecordingMap::new()));
        let (tx, rx) = oneshot::channel::<Vec<GeocodeResult>>();

        let lookup = annotate(&registry, LatLng::new(53.5, 9.9), |_| rx, no_venues);
        let user = async {
            let id = registry.borrow().places()[0].id();
            registry.borrow_mut().remove_place(id).unwrap();
            tx.send(vec![result("Elbchaussee", "1")]).unwrap();
        };
        block_on(join(lookup, user));

        let registry = registry.borrow();
        assert!(registry.places().is_empty());
        assert!(registry.map().pins.is_empty());
    }

    #[test]
    fn results_arrive_out_of_order() {
        let registry = RefCell::new(Registry::new(RecordingMap::new()));
        let (tx1, rx1) = oneshot::channel::<Vec<GeocodeResult>>();
        let (tx2, rx2) = oneshot::channel::<Vec<GeocodeResult>>();

        let first = annotate(&registry, LatLng::new(0.0, 0.0), |_| rx1, no_venues);
        let second = annotate(&registry, LatLng::new(1.0, 1.0), |_| rx2, no_venues);
        let answer = async {
            tx2.send(vec![result("Zweite", "2")]).unwrap();
            tx1.send(vec![result("Erste", "1")]).unwrap();
        };
        let ((a, b), ()) = block_on(join(join(first, second), answer));

        let registry = registry.borrow();
        assert!(a < b);
        assert_eq!(registry.get(a).unwrap().title, "Erste 1");
        assert_eq!(registry.get(b).unwrap().title, "Zweite 2");
        assert_eq!(registry.suggestions(), ["Erste 1", "Zweite 2"]);
    }
}
