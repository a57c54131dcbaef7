//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - City search against a geocoding service
//! - Abstraction over weather providers
//! - The lookup session tying search, selection and fetch together
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod geocode;
mod http;
pub mod model;
pub mod provider;
pub mod session;
pub mod units;

pub use config::{Config, MonthlyPeriod, ProviderConfig};
pub use error::{FailureKind, FetchError};
pub use geocode::{CityDirectory, GeoDbClient};
pub use model::{CityOption, CityQuery, Coordinates, Place, WeatherSummary};
pub use provider::{ProviderId, WeatherProvider};
pub use session::{FetchOutcome, LookupSession, SearchOutcome, WeatherState};
