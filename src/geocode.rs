//! Reverse geocoding through the Google Geocoding web service.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::ready;
use http::uri::InvalidUri;
use http::{Request, Response, StatusCode, Uri};
use http_body::Body;
use pin_project_lite::pin_project;
use serde::Deserialize;
use tower_service::Service;

use crate::error::Error;
use crate::place::LatLng;
use crate::response::{self, Collect};
use crate::util::Query;

const ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// A reverse geocoding request for a single position.
///
/// ## Example
///
/// ```rust,no_run
/// use place_registry::{GeocodeRequest, LatLng};
///
/// # async fn doc() {
/// let results = GeocodeRequest::new(LatLng::new(53.5, 9.9))
///     .key("api_key")
///     .send()
///     .await
///     .unwrap();
/// for r in results {
///     println!("{}", r.formatted_address);
/// }
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct GeocodeRequest<'a> {
    endpoint: Uri,
    position: LatLng,
    key: Cow<'a, str>,
    language: Cow<'a, str>,
}

pin_project! {
    /// A future which resolves to the results of a `GeocodeRequest`.
    pub struct FutureGeocode<F, B> {
        #[pin]
        inner: Collect<F, B>,
    }
}

/// One candidate address for the requested position.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// A structured part of a `GeocodeResult`, like a street name or a locality.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Picks an `AddressComponent` out of a `GeocodeResult`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSelector {
    /// The first component carrying the given type, like `"route"`.
    Type(String),
    /// The component at a fixed position.
    Index(usize),
}

/// Which address components make up the title of a place.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressMapping {
    pub street_name: ComponentSelector,
    pub street_number: ComponentSelector,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeocodeOptions {
    pub key: String,
    pub language: String,
    pub mapping: AddressMapping,
    pub endpoint: Option<String>,
}

#[derive(Deserialize)]
struct Reply {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

impl<'a> GeocodeRequest<'a> {
    pub fn new(position: LatLng) -> Self {
        GeocodeRequest {
            endpoint: Uri::from_static(ENDPOINT),
            position,
            key: Cow::Borrowed(""),
            language: Cow::Borrowed(""),
        }
    }

    /// Reset the endpoint URI to be queried.
    pub fn endpoint(&mut self, endpoint: Uri) -> &mut Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the API key. Setting an empty string will unset this parameter.
    pub fn key(&mut self, key: impl Into<Cow<'a, str>>) -> &mut Self {
        self.key = key.into();
        self
    }

    /// Set the language to return results in. Setting an empty string will unset
    /// this parameter.
    pub fn language(&mut self, language: impl Into<Cow<'a, str>>) -> &mut Self {
        self.language = language.into();
        self
    }

    /// Send the request, returning a `Future` which resolves to the results.
    ///
    /// # Panics
    ///
    /// This will panic if the underlying HTTPS connector failed to initialize.
    #[cfg(feature = "hyper")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hyper")))]
    pub fn send(&self) -> crate::hyper::FutureGeocode {
        self.send_with_client(crate::hyper::client())
    }

    /// Same as `send` except that it uses `client` to make the HTTP request.
    ///
    /// # Panics
    ///
    /// This will call `<S as Service>::call` without checking for `<S as Service>::poll_ready`
    /// and may cause a panic if `client` is not ready to send an HTTP request yet.
    pub fn send_with_client<S, ReqB, ResB>(&self, mut client: S) -> FutureGeocode<S::Future, ResB>
    where
        S: Service<Request<ReqB>, Response = Response<ResB>>,
        ReqB: Default,
    {
        let uri = Query::new(&self.endpoint)
            .append("latlng", self.position)
            .append_nonempty("key", &self.key)
            .append_nonempty("language", &self.language)
            .finish();
        FutureGeocode {
            inner: response::get(&mut client, uri),
        }
    }
}

impl<F, B, E> Future for FutureGeocode<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body<Error = E>,
{
    type Output = Result<Vec<GeocodeResult>, Error<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let (status, body) = ready!(self.project().inner.poll(cx))?;
        Poll::Ready(decode(status, &body))
    }
}

fn decode<E>(status: StatusCode, body: &[u8]) -> Result<Vec<GeocodeResult>, Error<E>> {
    if status != StatusCode::OK {
        return Err(Error::Http(status, None));
    }

    let reply: Reply = serde_json::from_slice(body)?;
    match &*reply.status {
        "OK" => Ok(reply.results),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => Err(Error::Geocoder {
            status: reply.status,
            message: reply.error_message,
        }),
    }
}

impl GeocodeResult {
    /// Derives a place title from this result.
    ///
    /// This is `"{street} {number}"` if `mapping` resolves both components, the street
    /// alone if only that resolves, and the first comma-separated segment of
    /// `formatted_address` otherwise.
    pub fn title(&self, mapping: &AddressMapping) -> Option<String> {
        let street = self.component(&mapping.street_name);
        let number = self.component(&mapping.street_number);
        match (street, number) {
            (Some(street), Some(number)) => Some(format!("{} {}", street, number)),
            (Some(street), None) => Some(street.to_owned()),
            _ => self
                .formatted_address
                .split(',')
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(String::from),
        }
    }

    pub fn component(&self, selector: &ComponentSelector) -> Option<&str> {
        let component = match selector {
            ComponentSelector::Type(t) => self
                .address_components
                .iter()
                .find(|c| c.types.iter().any(|ct| ct == t)),
            ComponentSelector::Index(i) => self.address_components.get(*i),
        };
        component
            .map(|c| c.long_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

impl Default for AddressMapping {
    fn default() -> Self {
        AddressMapping {
            street_name: ComponentSelector::Type("route".into()),
            street_number: ComponentSelector::Type("street_number".into()),
        }
    }
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        GeocodeOptions {
            key: String::new(),
            language: String::new(),
            mapping: AddressMapping::default(),
            endpoint: None,
        }
    }
}

impl GeocodeOptions {
    /// Creates a `GeocodeRequest` for `position` with these options applied.
    pub fn request(&self, position: LatLng) -> Result<GeocodeRequest<'_>, InvalidUri> {
        let mut req = GeocodeRequest::new(position);
        req.key(&*self.key).language(&*self.language);
        if let Some(ref endpoint) = self.endpoint {
            req.endpoint(endpoint.parse()?);
        }
        Ok(req)
    }
}
