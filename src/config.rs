//! Registry configuration.

use serde::Deserialize;

pub use crate::connectivity::ConnectivityOptions;
pub use crate::geocode::GeocodeOptions;
pub use crate::map::MapOptions;
pub use crate::notice::NoticeOptions;
pub use crate::venue::VenueOptions;

/// Configuration of a `Registry` and the lookups it drives.
///
/// Every section is optional when deserializing, falling back to its defaults.
///
/// ## Example
///
/// ```rust
/// use place_registry::Config;
///
/// let config = Config::from_json(r#"{
///     "venue": {"client_id": "id", "client_secret": "secret", "limit": 3},
///     "geocode": {"mapping": {"street_name": {"index": 1}, "street_number": {"index": 0}}}
/// }"#).unwrap();
/// assert_eq!(config.venue.limit, 3);
/// assert_eq!(config.map.zoom, 15);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapOptions,
    pub geocode: GeocodeOptions,
    pub venue: VenueOptions,
    pub notices: NoticeOptions,
    pub connectivity: ConnectivityOptions,
}

impl Config {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Set the venue API client credentials.
    pub fn venue_credentials(
        &mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> &mut Self {
        self.venue.client_id = client_id.into();
        self.venue.client_secret = client_secret.into();
        self
    }

    /// Set the geocoding API key.
    pub fn geocode_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.geocode.key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::place::LatLng;

    #[test]
    fn defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.map.center, LatLng::new(53.562261, 9.961613));
        assert_eq!(config.map.info_preview().as_millis(), 1500);
        assert_eq!(config.notices.ttl_ms, 3000);
        assert_eq!(config.connectivity.retry_interval_ms, 3000);
        assert!(config.venue.credentials().is_none());
    }

    #[test]
    fn partial_sections() {
        let config = Config::from_json(
            r#"{"map": {"zoom": 12}, "connectivity": {"retry_interval_ms": 500}}"#,
        )
        .unwrap();
        assert_eq!(config.map.zoom, 12);
        assert_eq!(config.map.center, MapOptions::default().center);
        assert_eq!(config.connectivity.retry_interval().as_millis(), 500);
    }

    #[test]
    fn setters() {
        let mut config = Config::default();
        config.venue_credentials("id", "secret").geocode_key("key");
        assert!(config.venue.credentials().is_some());
        assert_eq!(config.geocode.key, "key");
    }
}
