//! Error types

use http::StatusCode;

use crate::place::PlaceId;

/// An error occurred while querying a lookup API.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// An error from the underlying HTTP client.
    #[error("{0}")]
    Service(#[source] E),
    /// The API answered with a non-200 status, possibly with an error detail.
    #[error("HTTP {}{}", .0, fmt_detail(.1))]
    Http(StatusCode, Option<String>),
    /// The API returned a body that could not be parsed.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    /// The geocoder answered with a status other than `OK` or `ZERO_RESULTS`.
    #[error("{status}{}", fmt_detail(.message))]
    Geocoder {
        status: String,
        message: Option<String>,
    },
    /// The request could not be built from the given parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] http::Error),
}

/// A precondition of a registry operation was violated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no place with id {0}")]
    UnknownPlace(PlaceId),
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}
