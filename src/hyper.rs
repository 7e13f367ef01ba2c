//! Type aliases for use with `hyper` crate's HTTP client.

use hyper_pkg::client::{Client, HttpConnector, ResponseFuture};
use hyper_pkg::Body;
use hyper_tls::HttpsConnector;

pub use hyper_pkg::Error as HyperError;

pub type FutureGeocode = crate::geocode::FutureGeocode<ResponseFuture, Body>;
pub type FutureVenues = crate::venue::FutureVenues<ResponseFuture, Body>;
pub type Error = crate::Error<HyperError>;

pub(crate) fn client() -> Client<HttpsConnector<HttpConnector>, Body> {
    Client::builder().build::<_, Body>(HttpsConnector::new())
}
