use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cityweather_core::{
    CityOption, Config, FetchOutcome, GeoDbClient, LookupSession, MonthlyPeriod, Place,
    ProviderConfig, ProviderId, SearchOutcome, WeatherState,
    model::MIN_QUERY_LEN,
    provider::{default_provider_from_config, provider_from_config},
};
use inquire::{Password, Select, Text};

use crate::output::{render_options, render_summary};

/// Service name accepted by `configure` for the city search credentials.
const GEOCODING_SERVICE: &str = "geodb";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Look up the weather for a city")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a service: "geodb", "monthly" or "current".
    Configure {
        service: String,
    },

    /// List cities matching a prefix (at least 3 characters).
    Search {
        prefix: String,
    },

    /// Show weather for a city.
    Show {
        /// City name or prefix.
        city: String,

        /// Weather provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Skip the city search and query the provider with the text as typed.
        #[arg(long)]
        raw: bool,

        /// Take the first matching city instead of asking.
        #[arg(long)]
        first: bool,

        /// Start of the monthly aggregation period (YYYY-MM-DD).
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// End of the monthly aggregation period (YYYY-MM-DD).
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { service } => configure(&service),
            Command::Search { prefix } => search(&prefix).await,
            Command::Show { city, provider, raw, first, start, end } => {
                let period = match (start, end) {
                    (Some(start), Some(end)) => Some(MonthlyPeriod::new(start, end)?),
                    _ => None,
                };
                show(&city, provider.as_deref(), raw, first, period).await
            }
        }
    }
}

fn configure(service: &str) -> anyhow::Result<()> {
    // Environment overrides must not end up in the saved file.
    let mut config = Config::load_from(&Config::config_file_path()?)?;

    println!("Configuring {service}");
    let api_key = Password::new("API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let host = Text::new("API host (e.g. wft-geo-db.p.rapidapi.com):")
        .prompt()
        .context("Failed to read API host")?;

    if api_key.trim().is_empty() || host.trim().is_empty() {
        bail!("Both an API key and a host are required.");
    }
    let credentials = ProviderConfig::new(api_key.trim(), host.trim());

    if service.eq_ignore_ascii_case(GEOCODING_SERVICE) {
        config.geocoding = Some(credentials);
    } else {
        let id = ProviderId::try_from(service)?;
        config.upsert_provider(id, credentials);
    }

    let path = config.save()?;
    tracing::debug!(service, path = %path.display(), "Saved configuration");
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn search(prefix: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let options = search_options(&config, prefix).await?;
    println!("{}", render_options(&options));
    Ok(())
}

async fn search_options(config: &Config, prefix: &str) -> anyhow::Result<Vec<CityOption>> {
    let directory = GeoDbClient::new(config.geocoding_config()?.clone());
    let mut session = LookupSession::new();

    match session.search(&directory, prefix).await {
        Ok(SearchOutcome::Skipped) => {
            bail!("Type at least {MIN_QUERY_LEN} characters to search for a city.")
        }
        Ok(_) => Ok(session.options().to_vec()),
        Err(e) => {
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

async fn show(
    city: &str,
    provider: Option<&str>,
    raw: bool,
    first: bool,
    period: Option<MonthlyPeriod>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if period.is_some() {
        config.monthly_period = period;
    }

    let provider = match provider {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, &config)?,
        None => default_provider_from_config(&config)?,
    };

    let place = if raw {
        Place::named(city)
    } else {
        pick_city(&config, city, first).await?
    };

    tracing::debug!(provider = %provider.id(), place = %place, raw, "Fetching weather");

    let mut session = LookupSession::new();
    session.select(place.clone());

    match session.fetch_weather(provider.as_ref()).await {
        Ok(FetchOutcome::Updated(summary)) => {
            println!("{}", render_summary(&place, provider.id(), &summary));
            Ok(())
        }
        Ok(outcome) => bail!("No weather shown: {outcome:?}"),
        Err(e) => match session.weather() {
            WeatherState::Failed(message) => Err(anyhow::Error::new(e).context(message.clone())),
            _ => Err(e).context("Weather lookup failed"),
        },
    }
}

async fn pick_city(config: &Config, city: &str, first: bool) -> anyhow::Result<Place> {
    let mut options = search_options(config, city).await?;

    if options.is_empty() {
        bail!("No cities match '{city}'.");
    }
    if first || options.len() == 1 {
        return Ok(options.swap_remove(0).value);
    }

    let picked = Select::new("Pick a city:", options)
        .with_page_size(10)
        .prompt()
        .context("No city selected")?;

    Ok(picked.value)
}
