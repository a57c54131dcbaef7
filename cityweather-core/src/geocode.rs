//! City search against the GeoDB Cities API.
//!
//! Turns a typed prefix into a deduplicated list of [`CityOption`]s that the
//! picker can show.

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::ProviderConfig,
    error::FetchError,
    http::{build_client, rapidapi_get, read_json},
    model::{CityOption, CityQuery, Place},
};

const SERVICE: &str = "GeoDB";
const CITIES_PATH: &str = "/v1/geo/cities";

/// Anything that can turn a prefix into city options.
#[async_trait]
pub trait CityDirectory: Send + Sync + Debug {
    async fn search(&self, query: &CityQuery) -> Result<Vec<CityOption>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct GeoDbClient {
    config: ProviderConfig,
    http: Client,
}

impl GeoDbClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config, http: build_client() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoCityRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeoCitiesResponse {
    #[serde(default)]
    data: Option<Vec<GeoCityRecord>>,
}

impl GeoCityRecord {
    /// Label prefers `name`, the place prefers `city`. `None` when the record has neither.
    fn into_option(self) -> Option<CityOption> {
        let label = self.name.clone().or_else(|| self.city.clone())?;
        let name = self.city.or(self.name)?;
        let value = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Place::with_coordinates(name, lat, lon),
            _ => Place::named(name),
        };

        Some(CityOption { label, value })
    }
}

/// Map raw records to options, keeping only the first option for each value.
pub fn build_city_options(records: Vec<GeoCityRecord>) -> Vec<CityOption> {
    let mut seen = HashSet::new();

    records
        .into_iter()
        .filter_map(GeoCityRecord::into_option)
        .filter(|option| seen.insert(option.value.key()))
        .collect()
}

#[async_trait]
impl CityDirectory for GeoDbClient {
    #[instrument(skip(self), level = "info")]
    async fn search(&self, query: &CityQuery) -> Result<Vec<CityOption>, FetchError> {
        let url = format!("{}{}", self.config.base_url(), CITIES_PATH);

        let res = rapidapi_get(&self.http, &self.config, &url)
            .query(&[("types", "city"), ("namePrefix", query.as_str())])
            .send()
            .await?;

        let parsed: GeoCitiesResponse = read_json(SERVICE, res).await?;
        let options = build_city_options(parsed.data.unwrap_or_default());

        tracing::debug!(count = options.len(), "City search returned options");
        Ok(options)
    }
}
