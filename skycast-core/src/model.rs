//! Domain models decoded from the weather API.
//!
//! All of these are plain values: decoded once, never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geocoded city: the unit of search results and of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Some geocode payloads embed a current-conditions snapshot; kept when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Box<Forecast>>,
}

impl City {
    /// Coordinate bounds check. A record outside these ranges is a malformed
    /// payload and must not reach the weather endpoint.
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Full forecast bundle for one set of coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub current: Forecast,
    pub hourly: Vec<Forecast>,
    pub daily: Vec<Forecast>,
}

/// One forecast sample: a point in time plus its conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Unix timestamp, seconds.
    pub dt: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
    /// Scalar for current/hourly samples, a range for daily ones. Which one is
    /// decided by the shape of the upstream `temp` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<Temperature>,
    #[serde(default)]
    pub weather: Vec<Conditions>,
}

impl Forecast {
    fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    /// Hour label for the hourly strip, e.g. `3PM`.
    pub fn hour(&self) -> String {
        self.time()
            .map(|t| t.format("%-I%p").to_string())
            .unwrap_or_else(|| "--".to_string())
    }

    /// Weekday label for the daily list, e.g. `Tuesday`.
    pub fn day_name(&self) -> String {
        self.time()
            .map(|t| t.format("%A").to_string())
            .unwrap_or_else(|| "--".to_string())
    }

    /// Primary conditions entry, the one the render layer shows.
    pub fn conditions(&self) -> Option<&Conditions> {
        self.weather.first()
    }
}

/// Temperature as reported upstream: exactly one representation per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Temperature {
    Scalar(f64),
    Range(TemperatureRange),
}

impl Temperature {
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Temperature::Scalar(value) => Some(*value),
            Temperature::Range(_) => None,
        }
    }

    pub fn range(&self) -> Option<&TemperatureRange> {
        match self {
            Temperature::Scalar(_) => None,
            Temperature::Range(range) => Some(range),
        }
    }
}

/// Daily min/max plus the time-of-day breakdown when the API supplies one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morn: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night: Option<f64>,
}

/// One human-readable weather description with its icon identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub main: String,
    pub description: String,
    pub icon: String,
}
