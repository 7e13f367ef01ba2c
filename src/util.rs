use std::fmt::Display;

use http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// https://tools.ietf.org/html/rfc3986#section-2.3
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Appends percent-encoded query pairs to an endpoint URI.
pub struct Query {
    buf: String,
    has_query: bool,
}

impl Query {
    pub fn new(endpoint: &Uri) -> Self {
        Query {
            buf: endpoint.to_string(),
            has_query: endpoint.query().is_some(),
        }
    }

    pub fn append(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.buf.push(if self.has_query { '&' } else { '?' });
        self.has_query = true;
        self.buf.extend(utf8_percent_encode(key, UNRESERVED));
        self.buf.push('=');
        self.buf.extend(utf8_percent_encode(&value.to_string(), UNRESERVED));
        self
    }

    /// Appends the pair unless `value` is empty.
    pub fn append_nonempty(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.append(key, value);
        }
        self
    }

    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}
