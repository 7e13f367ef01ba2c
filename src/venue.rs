//! Nearby venue lookup through the Foursquare venue search API.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::ready;
use http::uri::InvalidUri;
use http::{Request, Response, StatusCode, Uri};
use http_body::Body;
use oauth_credentials::Credentials;
use pin_project_lite::pin_project;
use serde::Deserialize;
use tower_service::Service;

use crate::error::Error;
use crate::place::{LatLng, VenueSummary};
use crate::response::{self, Collect};
use crate::util::Query;

const ENDPOINT: &str = "https://api.foursquare.com/v2/venues/search";
const DEFAULT_LIMIT: u32 = 5;
const DEFAULT_VERSION: &str = "20160101";

/// A search for venues around a position.
///
/// The venue API identifies applications by a client id and secret pair, which is
/// passed as `Credentials`.
///
/// ## Example
///
/// ```rust,no_run
/// use place_registry::{Credentials, LatLng, VenueSearch};
///
/// # async fn doc() {
/// let credentials = Credentials::new("client_id", "client_secret");
/// let venues = VenueSearch::new(credentials, LatLng::new(53.5, 9.9))
///     .limit(3)
///     .send()
///     .await
///     .unwrap();
/// for v in venues {
///     println!("{}", v.name);
/// }
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct VenueSearch<'a, C = String> {
    endpoint: Uri,
    credentials: Credentials<C>,
    position: LatLng,
    limit: u32,
    version: Cow<'a, str>,
}

pin_project! {
    /// A future which resolves to the venues found by a `VenueSearch`.
    pub struct FutureVenues<F, B> {
        #[pin]
        inner: Collect<F, B>,
    }
}

/// A venue as returned by the venue search API.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Distance from the searched position in meters.
    pub distance: Option<u32>,
    #[serde(default)]
    pub formatted_address: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VenueOptions {
    pub client_id: String,
    pub client_secret: String,
    pub limit: u32,
    pub version: String,
    pub endpoint: Option<String>,
}

#[derive(Deserialize)]
struct Reply {
    response: Venues,
}

#[derive(Deserialize)]
struct Venues {
    venues: Vec<Venue>,
}

#[derive(Deserialize)]
struct ErrorReply {
    meta: Meta,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    error_detail: Option<String>,
}

impl<'a, C: AsRef<str>> VenueSearch<'a, C> {
    pub fn new(credentials: Credentials<C>, position: LatLng) -> Self {
        VenueSearch {
            endpoint: Uri::from_static(ENDPOINT),
            credentials,
            position,
            limit: DEFAULT_LIMIT,
            version: Cow::Borrowed(DEFAULT_VERSION),
        }
    }

    /// Reset the endpoint URI to be queried.
    pub fn endpoint(&mut self, endpoint: Uri) -> &mut Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the maximum number of venues to return.
    pub fn limit(&mut self, limit: u32) -> &mut Self {
        self.limit = limit;
        self
    }

    /// Set the API version date, in `YYYYMMDD` form.
    pub fn version(&mut self, version: impl Into<Cow<'a, str>>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// Send the search, returning a `Future` which resolves to the venues found.
    ///
    /// # Panics
    ///
    /// This will panic if the underlying HTTPS connector failed to initialize.
    #[cfg(feature = "hyper")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hyper")))]
    pub fn send(&self) -> crate::hyper::FutureVenues {
        self.send_with_client(crate::hyper::client())
    }

    /// Same as `send` except that it uses `client` to make the HTTP request.
    ///
    /// # Panics
    ///
    /// This will call `<S as Service>::call` without checking for `<S as Service>::poll_ready`
    /// and may cause a panic if `client` is not ready to send an HTTP request yet.
    pub fn send_with_client<S, ReqB, ResB>(&self, mut client: S) -> FutureVenues<S::Future, ResB>
    where
        S: Service<Request<ReqB>, Response = Response<ResB>>,
        ReqB: Default,
    {
        let uri = Query::new(&self.endpoint)
            .append("ll", self.position)
            .append("limit", self.limit)
            .append("client_id", self.credentials.identifier())
            .append("client_secret", self.credentials.secret())
            .append("v", &self.version)
            .finish();
        FutureVenues {
            inner: response::get(&mut client, uri),
        }
    }
}

impl<F, B, E> Future for FutureVenues<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body<Error = E>,
{
    type Output = Result<Vec<Venue>, Error<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let (status, body) = ready!(self.project().inner.poll(cx))?;
        Poll::Ready(decode(status, &body))
    }
}

fn decode<E>(status: StatusCode, body: &[u8]) -> Result<Vec<Venue>, Error<E>> {
    if status != StatusCode::OK {
        let detail = serde_json::from_slice::<ErrorReply>(body)
            .ok()
            .and_then(|r| r.meta.error_detail);
        return Err(Error::Http(status, detail));
    }

    let reply: Reply = serde_json::from_slice(body)?;
    Ok(reply.response.venues)
}

impl Venue {
    /// The compact form of this venue stored on a place.
    pub fn summary(&self) -> VenueSummary {
        VenueSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            categories: self.categories.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

impl Default for VenueOptions {
    fn default() -> Self {
        VenueOptions {
            client_id: String::new(),
            client_secret: String::new(),
            limit: DEFAULT_LIMIT,
            version: DEFAULT_VERSION.to_owned(),
            endpoint: None,
        }
    }
}

impl VenueOptions {
    /// The configured client credentials, unless either half of them is missing.
    pub fn credentials(&self) -> Option<Credentials<&str>> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            None
        } else {
            Some(Credentials::new(&*self.client_id, &*self.client_secret))
        }
    }

    /// Creates a `VenueSearch` for `position` with these options applied.
    ///
    /// Returns `Ok(None)` when no credentials are configured.
    pub fn search(&self, position: LatLng) -> Result<Option<VenueSearch<'_, &str>>, InvalidUri> {
        let credentials = match self.credentials() {
            Some(c) => c,
            None => return Ok(None),
        };
        let mut search = VenueSearch::new(credentials, position);
        search.limit(self.limit).version(&*self.version);
        if let Some(ref endpoint) = self.endpoint {
            search.endpoint(endpoint.parse()?);
        }
        Ok(Some(search))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use futures::executor::block_on;
    use tower::service_fn;

    use super::*;

    const VENUES: &str = r#"{
        "meta": {"code": 200},
        "response": {"venues": [
            {
                "id": "4b0588f8f964a520a0c722e3",
                "name": "Elbstrand",
                "location": {"lat": 53.546, "lng": 9.901, "distance": 40,
                             "formattedAddress": ["Elbchaussee", "Hamburg"]},
                "categories": [{"id": "4bf58dd8d48988d1e2941735", "name": "Beach"}]
            },
            {"id": "52a1", "name": "Kiosk"}
        ]}
    }"#;

    fn search(
        status: StatusCode,
        body: &'static str,
    ) -> Result<Vec<Venue>, Error<Infallible>> {
        let client = service_fn(move |req: Request<String>| async move {
            assert_eq!(
                req.uri(),
                "https://api.foursquare.com/v2/venues/search\
                 ?ll=53.5%2C9.9&limit=2&client_id=id&client_secret=s%26cret&v=20160101"
            );
            let mut res = Response::new(String::from(body));
            *res.status_mut() = status;
            Ok::<_, Infallible>(res)
        });
        block_on(
            VenueSearch::new(Credentials::new("id", "s&cret"), LatLng::new(53.5, 9.9))
                .limit(2)
                .send_with_client(client),
        )
    }

    #[test]
    fn finds_venues() {
        let venues = search(StatusCode::OK, VENUES).unwrap();
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].location.distance, Some(40));
        assert_eq!(
            venues[0].summary(),
            VenueSummary {
                id: "4b0588f8f964a520a0c722e3".into(),
                name: "Elbstrand".into(),
                categories: vec!["Beach".into()],
            }
        );
        assert!(venues[1].summary().categories.is_empty());
    }

    #[test]
    fn server_error() {
        match search(StatusCode::INTERNAL_SERVER_ERROR, "oops") {
            Err(Error::Http(status, None)) => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
            other => panic!("unexpected result: {:?}", other),
        }

        let body = r#"{"meta": {"code": 400, "errorType": "param_error",
                       "errorDetail": "Must provide a valid ll"}, "response": {}}"#;
        match search(StatusCode::BAD_REQUEST, body) {
            Err(Error::Http(_, Some(detail))) => assert_eq!(detail, "Must provide a valid ll"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn owned_credentials() {
        let credentials = Credentials::new(String::from("id"), String::from("secret"));
        let client = service_fn(|req: Request<String>| async move {
            let query = req.uri().query().unwrap_or("");
            assert!(query.contains("client_id=id&client_secret=secret"));
            Ok::<_, Infallible>(Response::new(String::from(r#"{"response": {"venues": []}}"#)))
        });
        let venues = block_on(
            VenueSearch::new(credentials, LatLng::new(0.0, 0.0)).send_with_client(client),
        );
        assert!(venues.unwrap().is_empty());
    }

    #[test]
    fn credentials_are_required() {
        let mut options = VenueOptions::default();
        options.client_id = "id".into();
        assert!(options.credentials().is_none());
        assert!(options.search(LatLng::new(0.0, 0.0)).unwrap().is_none());

        options.client_secret = "secret".into();
        let credentials = options.credentials().unwrap();
        assert_eq!(credentials.identifier(), "id");
        assert!(options.search(LatLng::new(0.0, 0.0)).unwrap().is_some());
    }
}
