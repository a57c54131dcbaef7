use anyhow::{Context, Result, anyhow, bail};
use chrono::{Datelike, Days, NaiveDate};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::ProviderId;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "CITYWEATHER";

/// Credentials for one RapidAPI-hosted service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    pub host: String,

    /// Overrides the `https://{host}` default, e.g. to point at a local mock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, host: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), host: host.into(), base_url: None }
    }

    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host),
        }
    }
}

/// Date range the monthly provider aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthlyPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("Invalid period: start {start} is after end {end}.");
        }
        Ok(Self { start, end })
    }

    /// The last complete calendar month before `today`.
    pub fn previous_month(today: NaiveDate) -> Self {
        let end = today - Days::new(u64::from(today.day()));
        let start = end - Days::new(u64::from(end.day() - 1));
        Self { start, end }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default weather provider id, e.g. "monthly" or "current".
    pub default_provider: Option<String>,

    /// Credentials for the city search service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding: Option<ProviderConfig>,

    /// Example TOML:
    /// [providers.monthly]
    /// api_key = "..."
    /// host = "meteostat.p.rapidapi.com"
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_period: Option<MonthlyPeriod>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        let s = self.default_provider.as_ref().ok_or_else(|| {
            anyhow!(
                "No default provider configured.\n\
                 Hint: run `cityweather configure <provider>` (e.g. `cityweather configure monthly`) first."
            )
        })?;

        ProviderId::try_from(s.as_str())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Set/replace a provider's credentials; the first one configured becomes the default.
    pub fn upsert_provider(&mut self, id: ProviderId, provider: ProviderConfig) {
        self.providers.insert(id.as_str().to_string(), provider);

        if self.default_provider.is_none() {
            self.set_default_provider(id);
        }
    }

    pub fn is_provider_configured(&self, id: ProviderId) -> bool {
        self.provider_config(id).is_some()
    }

    pub fn geocoding_config(&self) -> Result<&ProviderConfig> {
        self.geocoding.as_ref().ok_or_else(|| {
            anyhow!(
                "No credentials configured for city search.\n\
                 Hint: run `cityweather configure geodb` and enter your API key and host."
            )
        })
    }

    /// Monthly period from config, or the previous calendar month.
    pub fn monthly_period_or_default(&self, today: NaiveDate) -> MonthlyPeriod {
        self.monthly_period.unwrap_or_else(|| MonthlyPeriod::previous_month(today))
    }

    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&Self::config_file_path()?)?;
        cfg.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Merge `CITYWEATHER_*` variables, looked up through `lookup`, over the file values.
    ///
    /// Recognised names: `CITYWEATHER_PROVIDER` and
    /// `CITYWEATHER_{GEODB,MONTHLY,CURRENT}_{KEY,HOST,BASE_URL}`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup(&format!("{ENV_PREFIX}_PROVIDER")) {
            let id = ProviderId::try_from(provider.as_str())
                .with_context(|| format!("Invalid {ENV_PREFIX}_PROVIDER"))?;
            self.set_default_provider(id);
        }

        merge_service(&mut self.geocoding, "GEODB", &lookup)?;

        for id in ProviderId::all() {
            let mut entry = self.providers.remove(id.as_str());
            merge_service(&mut entry, &id.as_str().to_uppercase(), &lookup)?;
            if let Some(provider) = entry {
                self.upsert_provider(*id, provider);
            }
        }

        Ok(())
    }
}

fn merge_service<F>(slot: &mut Option<ProviderConfig>, service: &str, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let key = lookup(&format!("{ENV_PREFIX}_{service}_KEY"));
    let host = lookup(&format!("{ENV_PREFIX}_{service}_HOST"));
    let base_url = lookup(&format!("{ENV_PREFIX}_{service}_BASE_URL"));

    match slot {
        Some(existing) => {
            if let Some(key) = key {
                existing.api_key = key;
            }
            if let Some(host) = host {
                existing.host = host;
            }
            if base_url.is_some() {
                existing.base_url = base_url;
            }
        }
        None => match (key, host) {
            (Some(api_key), Some(host)) => {
                *slot = Some(ProviderConfig { api_key, host, base_url });
            }
            (None, None) => {}
            _ => bail!(
                "Both {ENV_PREFIX}_{service}_KEY and {ENV_PREFIX}_{service}_HOST must be set \
                 when {service} is not configured in the config file."
            ),
        },
    }

    Ok(())
}
