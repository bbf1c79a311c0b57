//! Search orchestration: geocode, fetch, render
//!
//! Each search carries its own [`SearchContext`] and is stamped with a request
//! token. Searches may overlap; only the one holding the latest token is
//! allowed to replace the displayed view.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::api::WeatherApi;
use crate::autocomplete::{Autocomplete, SelectedCandidate, Suggestion};
use crate::config::CitycastConfig;
use crate::geocoder::Geocoder;
use crate::models::{CityQuery, ResolvedCity};
use crate::render::{DayCount, ForecastView, RenderOptions, render_forecast};

/// What to search for and how many days to show
#[derive(Debug, Clone, PartialEq)]
pub struct SearchContext {
    pub query: CityQuery,
    pub days: DayCount,
}

impl SearchContext {
    #[must_use]
    pub fn new(query: CityQuery, days: DayCount) -> Self {
        Self { query, days }
    }
}

/// Result of a completed search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The view was rendered and is now the displayed one
    Rendered(ForecastView),
    /// A newer search was issued while this one was in flight
    Superseded { token: u64 },
}

/// Monotonic request tokens; the latest issued token owns the display
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: AtomicU64,
}

impl RequestTokens {
    /// Issue a new token, invalidating every earlier one
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

/// The state a front end keeps between searches
#[derive(Debug, Default)]
struct Displayed {
    view: Option<ForecastView>,
    city: Option<ResolvedCity>,
}

pub struct ForecastOrchestrator {
    geocoder: Geocoder,
    api: Arc<dyn WeatherApi>,
    autocomplete: Autocomplete,
    options: RenderOptions,
    tokens: RequestTokens,
    selection: Mutex<Option<SelectedCandidate>>,
    displayed: Mutex<Displayed>,
}

impl ForecastOrchestrator {
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>, config: &CitycastConfig) -> Self {
        Self {
            geocoder: Geocoder::new(api.clone(), &config.geocoding),
            autocomplete: Autocomplete::new(
                api.clone(),
                config.geocoding.candidate_count,
                config.display.suggestion_limit,
            ),
            options: RenderOptions::from_config(&config.forecast, &config.display),
            api,
            tokens: RequestTokens::default(),
            selection: Mutex::new(None),
            displayed: Mutex::new(Displayed::default()),
        }
    }

    /// Suggestions for partially typed input; drops any pending selection
    pub async fn suggest(&self, input: &str) -> Result<Vec<Suggestion>> {
        self.selection.lock().take();
        self.autocomplete.suggest(input).await
    }

    /// Remember a suggestion for the next search
    pub fn select(&self, suggestion: Suggestion) {
        debug!("Selected suggestion: {}", suggestion.label);
        *self.selection.lock() = Some(suggestion.into());
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection.lock().is_some()
    }

    /// Run one search
    ///
    /// A pending selection is always consumed. When its name matches the
    /// context's query it replaces that query, so its coordinates are used
    /// without geocoding; otherwise it is discarded and the query is geocoded.
    #[instrument(skip(self, ctx), fields(query = %ctx.query.display(), days = %ctx.days))]
    pub async fn show_forecast(&self, ctx: SearchContext) -> Result<SearchOutcome> {
        let token = self.tokens.issue();
        let selected = self.selection.lock().take();
        let query = match selected {
            Some(selected) if selected.matches(&ctx.query) => selected.into_query(),
            Some(selected) => {
                debug!(
                    "Dropping selection '{}', search is for '{}'",
                    selected.candidate().label(),
                    ctx.query.display()
                );
                ctx.query
            }
            None => ctx.query,
        };

        let city = self.geocoder.resolve(&query).await?;
        let data = self.api.forecast(city.coordinates).await?;
        let view = render_forecast(
            &data,
            &city,
            ctx.days,
            data.local_now(Utc::now()),
            &self.options,
        )?;

        let mut displayed = self.displayed.lock();
        if !self.tokens.is_current(token) {
            debug!("Discarding superseded response for '{}' (token {})", query.display(), token);
            return Ok(SearchOutcome::Superseded { token });
        }

        info!("Showing {}-day forecast for {}", ctx.days, view.city);
        displayed.view = Some(view.clone());
        displayed.city = Some(city);
        Ok(SearchOutcome::Rendered(view))
    }

    /// The view most recently applied
    #[must_use]
    pub fn current_view(&self) -> Option<ForecastView> {
        self.displayed.lock().view.clone()
    }

    /// Query for the city on display, carrying its coordinates
    #[must_use]
    pub fn last_query(&self) -> Option<CityQuery> {
        self.displayed.lock().city.as_ref().map(CityQuery::resolved)
    }
}
