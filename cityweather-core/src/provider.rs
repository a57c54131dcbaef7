use crate::{
    Config, FetchError,
    model::{Place, WeatherSummary},
    provider::{current::CurrentConditionsProvider, monthly::MonthlyProvider},
};
use async_trait::async_trait;
use chrono::Utc;
use std::{convert::TryFrom, fmt::Debug};

pub mod current;
pub mod monthly;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// Monthly aggregates by coordinates (Meteostat).
    Monthly,
    /// Current conditions by city name, reported in Fahrenheit.
    Current,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Monthly => "monthly",
            ProviderId::Current => "current",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Monthly, ProviderId::Current]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "monthly" | "meteostat" => Ok(ProviderId::Monthly),
            "current" => Ok(ProviderId::Current),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: monthly, current."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch(&self, place: &Place) -> Result<WeatherSummary, FetchError>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let provider = config.provider_config(id).cloned().ok_or_else(|| {
        anyhow::anyhow!(
            "No credentials configured for provider '{id}'.\n\
                 Hint: run `cityweather configure {id}` and enter your API key and host."
        )
    })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Monthly => {
            let period = config.monthly_period_or_default(Utc::now().date_naive());
            Box::new(MonthlyProvider::new(provider, period))
        }
        ProviderId::Current => Box::new(CurrentConditionsProvider::new(provider)),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ProviderConfig};

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("Meteostat").unwrap(), ProviderId::Monthly);
        assert_eq!(ProviderId::try_from("CURRENT").unwrap(), ProviderId::Current);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_from_config_errors_when_missing_credentials() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::Monthly, &cfg).unwrap_err();
        assert!(err.to_string().contains("No credentials configured for provider"));
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `cityweather configure"));
    }

    #[test]
    fn default_provider_from_config_builds_configured_provider() {
        let mut cfg = Config::default();
        cfg.upsert_provider(ProviderId::Current, ProviderConfig::new("KEY", "weather.example"));

        let provider = default_provider_from_config(&cfg).expect("provider should build");
        assert_eq!(provider.id(), ProviderId::Current);
    }
}
