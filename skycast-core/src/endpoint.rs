//! Request descriptors for the weather API and its icon assets.
//!
//! An [`Endpoint`] carries a path and an ordered query-parameter list; it is
//! resolved against a configured base URL only when the request is made.
//! Parameter order is insertion order and survives into the serialized URL,
//! which keeps built URLs reproducible.

use url::Url;

use crate::config::ApiConfig;
use crate::error::SearchError;

/// Measurement system sent with every weather request.
const UNITS: &str = "imperial";

/// How many candidate cities a name search may return.
const SEARCH_LIMIT: &str = "3";

const ICON_PATH_PREFIX: &str = "/img/wn/";
const ICON_SUFFIX: &str = "@2x.png";

/// API paths, one per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Path {
    Geocode,
    ReverseGeocode,
    Weather,
}

impl Path {
    pub fn as_str(self) -> &'static str {
        match self {
            Path::Geocode => "/geo/1.0/direct",
            Path::ReverseGeocode => "/geo/1.0/reverse",
            Path::Weather => "/data/3.0/onecall",
        }
    }
}

/// Closed set of query-parameter keys the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKey {
    Lat,
    Lon,
    Appid,
    Units,
    Q,
    Limit,
}

impl ParameterKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterKey::Lat => "lat",
            ParameterKey::Lon => "lon",
            ParameterKey::Appid => "appid",
            ParameterKey::Units => "units",
            ParameterKey::Q => "q",
            ParameterKey::Limit => "limit",
        }
    }
}

/// A fully-specified request descriptor: path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    path: Path,
    query: Vec<(ParameterKey, String)>,
}

impl Endpoint {
    /// Forecast request for a pair of coordinates.
    pub fn weather(api: &ApiConfig, lat: f64, lon: f64) -> Self {
        Self {
            path: Path::Weather,
            query: vec![
                (ParameterKey::Lat, coordinate(lat)),
                (ParameterKey::Lon, coordinate(lon)),
                (ParameterKey::Appid, api.api_key.clone()),
                (ParameterKey::Units, UNITS.to_string()),
            ],
        }
    }

    /// Geocode request for a city and state name.
    pub fn search(api: &ApiConfig, city: &str, state: &str) -> Self {
        Self {
            path: Path::Geocode,
            query: vec![
                (
                    ParameterKey::Q,
                    format!("{city}, {state}, {}", api.country_code),
                ),
                (ParameterKey::Limit, SEARCH_LIMIT.to_string()),
                (ParameterKey::Appid, api.api_key.clone()),
            ],
        }
    }

    /// Reverse-geocode request for a pair of coordinates.
    pub fn reverse_geocode(api: &ApiConfig, lat: f64, lon: f64) -> Self {
        Self {
            path: Path::ReverseGeocode,
            query: vec![
                (ParameterKey::Lat, coordinate(lat)),
                (ParameterKey::Lon, coordinate(lon)),
                (ParameterKey::Appid, api.api_key.clone()),
            ],
        }
    }

    pub fn path(&self) -> Path {
        self.path
    }

    /// Resolve the descriptor against a base URL.
    ///
    /// Fails with [`SearchError::InvalidUrl`] when the base URL is empty or
    /// unparseable; the caller always sees an explicit error, never a silently
    /// dropped request.
    pub fn url(&self, base_url: &str) -> Result<Url, SearchError> {
        let mut url = Url::parse(base_url).map_err(|_| SearchError::InvalidUrl)?;
        if !url.has_host() {
            return Err(SearchError::InvalidUrl);
        }
        url.set_path(self.path.as_str());
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key.as_str(), value);
            }
        }
        Ok(url)
    }
}

/// Render a coordinate for a query value. The debug form keeps the trailing
/// `.0` on whole numbers, so `40.0` serializes as `lat=40.0`.
fn coordinate(value: f64) -> String {
    format!("{value:?}")
}

/// Build the asset URL for a weather icon identifier, e.g. `01d`.
///
/// Icons live on a separate host from the data API; the URL is the icon base
/// plus a fixed path prefix, the identifier, and a fixed suffix.
pub fn icon_url(icon_base_url: &str, name: &str) -> Result<Url, SearchError> {
    if name.is_empty() {
        return Err(SearchError::InvalidUrl);
    }
    let base = Url::parse(icon_base_url).map_err(|_| SearchError::InvalidUrl)?;
    if !base.has_host() {
        return Err(SearchError::InvalidUrl);
    }
    base.join(&format!("{ICON_PATH_PREFIX}{name}{ICON_SUFFIX}"))
        .map_err(|_| SearchError::InvalidUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiConfig {
        ApiConfig {
            api_key: "test-key".to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn weather_endpoint_preserves_parameter_order() {
        let url = Endpoint::weather(&api(), 40.0, -75.0)
            .url("https://api.openweathermap.org")
            .expect("url must build");

        assert_eq!(url.path(), "/data/3.0/onecall");
        assert_eq!(
            url.query(),
            Some("lat=40.0&lon=-75.0&appid=test-key&units=imperial")
        );
    }

    #[test]
    fn whole_number_coordinates_keep_the_trailing_decimal() {
        let url = Endpoint::reverse_geocode(&api(), 40.0, -75.0)
            .url("https://api.openweathermap.org")
            .expect("url must build");

        assert_eq!(url.query(), Some("lat=40.0&lon=-75.0&appid=test-key"));
    }

    #[test]
    fn search_endpoint_formats_query_and_limit() {
        let url = Endpoint::search(&api(), "Plano", "TX")
            .url("https://api.openweathermap.org")
            .expect("url must build");

        assert_eq!(url.path(), "/geo/1.0/direct");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Plano, TX, USA".to_string()),
                ("limit".to_string(), "3".to_string()),
                ("appid".to_string(), "test-key".to_string()),
            ]
        );
    }

    #[test]
    fn reverse_geocode_endpoint_carries_coordinates() {
        let url = Endpoint::reverse_geocode(&api(), 33.0198, -96.6989)
            .url("https://api.openweathermap.org")
            .expect("url must build");

        assert_eq!(url.path(), "/geo/1.0/reverse");
        assert_eq!(url.query(), Some("lat=33.0198&lon=-96.6989&appid=test-key"));
    }

    #[test]
    fn building_twice_yields_identical_urls() {
        let a = Endpoint::weather(&api(), 40.0, -75.0);
        let b = Endpoint::weather(&api(), 40.0, -75.0);
        assert_eq!(a, b);
        assert_eq!(
            a.url("https://api.openweathermap.org").expect("url"),
            b.url("https://api.openweathermap.org").expect("url"),
        );
    }

    #[test]
    fn empty_base_url_is_an_explicit_error() {
        let err = Endpoint::weather(&api(), 40.0, -75.0).url("").unwrap_err();
        assert!(matches!(err, SearchError::InvalidUrl));
    }

    #[test]
    fn icon_url_uses_the_icon_host_template() {
        let url = icon_url("https://openweathermap.org", "01d").expect("icon url");
        assert_eq!(url.as_str(), "https://openweathermap.org/img/wn/01d@2x.png");
    }

    #[test]
    fn icon_url_rejects_empty_identifier() {
        let err = icon_url("https://openweathermap.org", "").unwrap_err();
        assert!(matches!(err, SearchError::InvalidUrl));
    }
}
