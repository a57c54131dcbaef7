use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::{MonthlyPeriod, ProviderConfig},
    error::FetchError,
    http::{build_client, rapidapi_get, read_json},
    model::{Place, WeatherSummary},
};

use super::{ProviderId, WeatherProvider};

const SERVICE: &str = "Meteostat";

/// Monthly aggregates for a point, already reported in Celsius.
#[derive(Debug, Clone)]
pub struct MonthlyProvider {
    config: ProviderConfig,
    period: MonthlyPeriod,
    http: Client,
}

impl MonthlyProvider {
    pub fn new(config: ProviderConfig, period: MonthlyPeriod) -> Self {
        Self { config, period, http: build_client() }
    }
}

#[derive(Debug, Deserialize)]
struct MsResponse {
    #[serde(default)]
    data: Option<Vec<MsMonth>>,
}

#[derive(Debug, Deserialize)]
struct MsMonth {
    tavg: Option<f64>,
    tmin: Option<f64>,
    tmax: Option<f64>,
    prcp: Option<f64>,
    wspd: Option<f64>,
}

impl MsMonth {
    fn into_summary(self) -> Result<WeatherSummary, FetchError> {
        Ok(WeatherSummary {
            temperature: required(self.tavg, "tavg")?,
            min_temperature: required(self.tmin, "tmin")?,
            max_temperature: required(self.tmax, "tmax")?,
            precipitation: self.prcp,
            wind_speed: self.wspd,
        })
    }
}

fn required(value: Option<f64>, field: &str) -> Result<f64, FetchError> {
    value.ok_or_else(|| FetchError::Parse {
        service: SERVICE,
        message: format!("field `{field}` is null"),
    })
}

#[async_trait]
impl WeatherProvider for MonthlyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Monthly
    }

    #[instrument(skip(self, place), fields(place = %place.name), level = "info")]
    async fn fetch(&self, place: &Place) -> Result<WeatherSummary, FetchError> {
        let coords = place
            .coordinates
            .ok_or_else(|| FetchError::MissingCoordinates(place.name.clone()))?;

        let url = format!("{}/point/monthly", self.config.base_url());

        let res = rapidapi_get(&self.http, &self.config, &url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("start", self.period.start.format("%Y-%m-%d").to_string()),
                ("end", self.period.end.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        let parsed: MsResponse = read_json(SERVICE, res).await?;

        let month = parsed
            .data
            .and_then(|months| months.into_iter().next())
            .ok_or(FetchError::Empty(SERVICE))?;

        let summary = month.into_summary()?;
        tracing::debug!(?summary, "Monthly aggregate received");
        Ok(summary)
    }
}
