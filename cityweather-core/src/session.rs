//! Lookup session: the transient state behind the city picker and weather card.
//!
//! The session owns the option list, the selected place and the weather state.
//! Every request is tagged with a [`Ticket`]; a response whose ticket is no
//! longer the latest one is dropped, so a late answer can never overwrite a
//! newer result or show weather for a city other than the selected one.

use crate::{
    error::FetchError,
    geocode::CityDirectory,
    model::{CityOption, CityQuery, Place, WeatherSummary},
    provider::WeatherProvider,
};

/// What the weather card currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherState {
    /// Nothing fetched yet for the selected place.
    #[default]
    Empty,
    Loading,
    Ready(WeatherSummary),
    /// Last fetch failed; holds the message to show the user.
    Failed(String),
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Prefix too short; nothing was sent.
    Skipped,
    /// Options were replaced with this many entries.
    Replaced(usize),
    /// A newer search was issued before this one completed.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No city selected; nothing was sent.
    NoSelection,
    /// A fetch is already running; the call was ignored.
    InFlight,
    /// The selection changed while the request was running.
    Stale,
    Updated(WeatherSummary),
}

#[derive(Debug, Default)]
pub struct LookupSession {
    options: Vec<CityOption>,
    selected: Option<Place>,
    weather: WeatherState,
    search_seq: u64,
    fetch_seq: u64,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> &[CityOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&Place> {
        self.selected.as_ref()
    }

    pub fn weather(&self) -> &WeatherState {
        &self.weather
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.weather, WeatherState::Loading)
    }

    /// Validate the prefix and issue a search ticket. `None` leaves everything untouched.
    pub fn begin_search(&mut self, prefix: &str) -> Option<(Ticket, CityQuery)> {
        let query = CityQuery::new(prefix)?;
        self.search_seq += 1;
        Some((Ticket(self.search_seq), query))
    }

    /// Apply a search result. Failures leave the current options in place.
    pub fn complete_search(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<CityOption>, FetchError>,
    ) -> Result<SearchOutcome, FetchError> {
        if ticket.0 != self.search_seq {
            tracing::debug!(?ticket, latest = self.search_seq, "Dropping stale search result");
            return Ok(SearchOutcome::Stale);
        }

        match result {
            Ok(options) => {
                let count = options.len();
                self.options = options;
                Ok(SearchOutcome::Replaced(count))
            }
            Err(e) => {
                tracing::warn!("City search failed: {e}");
                Err(e)
            }
        }
    }

    /// Run one city search through `directory`.
    pub async fn search(
        &mut self,
        directory: &dyn CityDirectory,
        prefix: &str,
    ) -> Result<SearchOutcome, FetchError> {
        let Some((ticket, query)) = self.begin_search(prefix) else {
            tracing::debug!(prefix, "Prefix too short, search skipped");
            return Ok(SearchOutcome::Skipped);
        };

        let result = directory.search(&query).await;
        self.complete_search(ticket, result)
    }

    /// Select a place and clear whatever weather was shown for the previous one.
    pub fn select(&mut self, place: Place) {
        self.selected = Some(place);
        self.weather = WeatherState::Empty;
        // Invalidates any fetch still running for the previous selection.
        self.fetch_seq += 1;
    }

    /// Select one of the current options by index.
    pub fn select_option(&mut self, index: usize) -> Option<&Place> {
        let place = self.options.get(index)?.value.clone();
        self.select(place);
        self.selected.as_ref()
    }

    /// Enter `Loading` and issue a fetch ticket for the selected place.
    pub fn begin_fetch(&mut self) -> Result<(Ticket, Place), FetchOutcome> {
        let place = self.selected.clone().ok_or(FetchOutcome::NoSelection)?;
        if self.is_loading() {
            return Err(FetchOutcome::InFlight);
        }

        self.fetch_seq += 1;
        self.weather = WeatherState::Loading;
        Ok((Ticket(self.fetch_seq), place))
    }

    /// Leave `Loading` with either the summary or a visible failure.
    pub fn complete_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<WeatherSummary, FetchError>,
    ) -> Result<FetchOutcome, FetchError> {
        if ticket.0 != self.fetch_seq {
            tracing::debug!(?ticket, latest = self.fetch_seq, "Dropping stale weather result");
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(summary) => {
                if let Some(place) = &self.selected {
                    tracing::info!(place = %place.name, "Weather updated");
                }
                self.weather = WeatherState::Ready(summary.clone());
                Ok(FetchOutcome::Updated(summary))
            }
            Err(e) => {
                tracing::warn!("Weather fetch failed: {e}");
                self.weather = WeatherState::Failed(e.user_message());
                Err(e)
            }
        }
    }

    /// Fetch weather for the selected place through `provider`.
    pub async fn fetch_weather(
        &mut self,
        provider: &dyn WeatherProvider,
    ) -> Result<FetchOutcome, FetchError> {
        let (ticket, place) = match self.begin_fetch() {
            Ok(issued) => issued,
            Err(outcome) => return Ok(outcome),
        };

        let result = provider.fetch(&place).await;
        self.complete_fetch(ticket, result)
    }
}
