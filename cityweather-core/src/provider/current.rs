use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::ProviderConfig,
    error::FetchError,
    http::{build_client, rapidapi_get, read_json},
    model::{Place, WeatherSummary},
    units::fahrenheit_to_celsius,
};

use super::{ProviderId, WeatherProvider};

const SERVICE: &str = "Current conditions";

/// Current conditions looked up by city name. The service reports Fahrenheit.
#[derive(Debug, Clone)]
pub struct CurrentConditionsProvider {
    config: ProviderConfig,
    http: Client,
}

impl CurrentConditionsProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config, http: build_client() }
    }
}

#[derive(Debug, Deserialize)]
struct CcMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct CcResponse {
    main: CcMain,
}

#[async_trait]
impl WeatherProvider for CurrentConditionsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Current
    }

    #[instrument(skip(self, place), fields(place = %place.name), level = "info")]
    async fn fetch(&self, place: &Place) -> Result<WeatherSummary, FetchError> {
        let url = format!(
            "{}/city/{}",
            self.config.base_url(),
            urlencoding::encode(&place.name)
        );

        let res = rapidapi_get(&self.http, &self.config, &url).send().await?;
        let parsed: CcResponse = read_json(SERVICE, res).await?;

        Ok(WeatherSummary {
            temperature: fahrenheit_to_celsius(parsed.main.temp),
            min_temperature: fahrenheit_to_celsius(parsed.main.temp_min),
            max_temperature: fahrenheit_to_celsius(parsed.main.temp_max),
            precipitation: None,
            wind_speed: None,
        })
    }
}
