use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest prefix the city search will send to the geocoder, in Unicode scalar values.
pub const MIN_QUERY_LEN: usize = 3;

/// A city-name prefix long enough to search on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery(String);

impl CityQuery {
    /// Returns `None` when the prefix has fewer than [`MIN_QUERY_LEN`] Unicode scalar
    /// values (`char`s). A character outside the BMP counts once, not as two UTF-16 units.
    pub fn new(prefix: &str) -> Option<Self> {
        if prefix.chars().count() < MIN_QUERY_LEN {
            return None;
        }

        Some(Self(prefix.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The location key every weather provider is queried with.
///
/// Cities picked from the geocoder carry coordinates; free text typed by the
/// user carries only a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

/// Hashable identity of a [`Place`], used to deduplicate city options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceKey {
    name: String,
    coordinates: Option<(u64, u64)>,
}

impl Place {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), coordinates: None }
    }

    pub fn with_coordinates(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self { name: name.into(), coordinates: Some(Coordinates { lat, lon }) }
    }

    pub fn key(&self) -> PlaceKey {
        PlaceKey {
            name: self.name.clone(),
            coordinates: self
                .coordinates
                .map(|c| (canonical_bits(c.lat), canonical_bits(c.lon))),
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coordinates {
            Some(c) => write!(f, "{} ({:.4}, {:.4})", self.name, c.lat, c.lon),
            None => f.write_str(&self.name),
        }
    }
}

// -0.0 and 0.0 compare equal, so they must hash equal too.
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

/// One selectable entry in the city picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityOption {
    pub label: String,
    pub value: Place,
}

impl fmt::Display for CityOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Normalized weather figures, all temperatures in Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Millimetres; only reported by the monthly provider.
    pub precipitation: Option<f64>,
    /// km/h; only reported by the monthly provider.
    pub wind_speed: Option<f64>,
}
