//! Place suggestions for partially typed input
//!
//! Input is `name[, state-prefix]`. Candidates come from the same geocoding
//! search as [`crate::geocoder`], are filtered by the state prefix and capped.
//! A chosen suggestion becomes a [`SelectedCandidate`], which lets the next
//! search skip geocoding entirely.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::api::WeatherApi;
use crate::models::location::split_state_hint;
use crate::models::{CityQuery, GeocodeCandidate};

/// One entry of the suggestion list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// "Name, State, Country"
    pub label: String,
    pub candidate: GeocodeCandidate,
}

impl From<GeocodeCandidate> for Suggestion {
    fn from(candidate: GeocodeCandidate) -> Self {
        Self {
            label: candidate.label(),
            candidate,
        }
    }
}

/// A suggestion the user picked, waiting to be consumed by the next search
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCandidate(GeocodeCandidate);

impl SelectedCandidate {
    #[must_use]
    pub fn candidate(&self) -> &GeocodeCandidate {
        &self.0
    }

    /// Whether a typed query still refers to this candidate (same name, any case)
    #[must_use]
    pub fn matches(&self, query: &CityQuery) -> bool {
        self.0.name.to_lowercase() == query.name.trim().to_lowercase()
    }

    /// Query carrying the candidate's coordinates, name and state
    #[must_use]
    pub fn into_query(self) -> CityQuery {
        let coordinates = self.0.coordinates();
        CityQuery {
            name: self.0.name,
            state: self.0.admin1,
            coordinates: Some(coordinates),
        }
    }
}

impl From<Suggestion> for SelectedCandidate {
    fn from(suggestion: Suggestion) -> Self {
        Self(suggestion.candidate)
    }
}

/// Suggestion source backed by the geocoding search
#[derive(Clone)]
pub struct Autocomplete {
    api: Arc<dyn WeatherApi>,
    candidate_count: u8,
    limit: usize,
}

impl Autocomplete {
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>, candidate_count: u8, limit: usize) -> Self {
        Self {
            api,
            candidate_count,
            limit,
        }
    }

    /// Suggestions for the text typed so far; empty input makes no request
    pub async fn suggest(&self, input: &str) -> Result<Vec<Suggestion>> {
        let (name, hint) = split_state_hint(input);
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.api.search(name, self.candidate_count).await?;
        let total = candidates.len();
        let suggestions = filter_by_state(candidates, hint, self.limit);

        debug!(
            "{} of {} candidates for '{}' kept as suggestions",
            suggestions.len(),
            total,
            input
        );
        Ok(suggestions)
    }
}

/// Keep candidates whose `admin1` starts with `hint` (case-insensitive), at most `limit`
pub fn filter_by_state(
    candidates: Vec<GeocodeCandidate>,
    hint: Option<&str>,
    limit: usize,
) -> Vec<Suggestion> {
    let hint = hint.map(str::to_lowercase);
    candidates
        .into_iter()
        .filter(|c| match &hint {
            Some(prefix) => c
                .admin1
                .as_deref()
                .is_some_and(|state| state.to_lowercase().starts_with(prefix.as_str())),
            None => true,
        })
        .take(limit)
        .map(Suggestion::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CitycastError;
    use crate::models::{Coordinates, ForecastData};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn springfields() -> Vec<GeocodeCandidate> {
        [
            ("Illinois", 39.80),
            ("Missouri", 37.21),
            ("Massachusetts", 42.10),
            ("Ohio", 39.92),
            ("Oregon", 44.05),
            ("Virginia", 38.78),
            ("Michigan", 42.32),
        ]
        .into_iter()
        .map(|(state, lat)| GeocodeCandidate {
            name: "Springfield".to_string(),
            latitude: lat,
            longitude: -90.0,
            admin1: Some(state.to_string()),
            admin2: None,
            country: Some("United States".to_string()),
        })
        .collect()
    }

    struct FixedApi {
        searches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WeatherApi for FixedApi {
        async fn search(&self, name: &str, _count: u8) -> Result<Vec<GeocodeCandidate>> {
            self.searches.lock().push(name.to_string());
            Ok(springfields())
        }

        async fn forecast(&self, _coordinates: Coordinates) -> Result<ForecastData> {
            Err(CitycastError::api("not used"))
        }
    }

    #[test]
    fn test_no_hint_caps_at_limit() {
        let suggestions = filter_by_state(springfields(), None, 5);
        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0].label, "Springfield, Illinois, United States");
    }

    #[test]
    fn test_hint_is_case_insensitive_prefix() {
        let suggestions = filter_by_state(springfields(), Some("m"), 5);
        let states: Vec<_> = suggestions
            .iter()
            .filter_map(|s| s.candidate.admin1.as_deref())
            .collect();
        assert_eq!(states, ["Missouri", "Massachusetts", "Michigan"]);

        let suggestions = filter_by_state(springfields(), Some("OR"), 5);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].candidate.latitude, 44.05);
    }

    #[test]
    fn test_hint_skips_candidates_without_state() {
        let mut candidates = springfields();
        candidates[0].admin1 = None;
        let suggestions = filter_by_state(candidates, Some("i"), 5);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_selected_candidate_into_query() {
        let suggestion = Suggestion::from(springfields().remove(1));
        let query = SelectedCandidate::from(suggestion).into_query();
        assert_eq!(query.name, "Springfield");
        assert_eq!(query.state.as_deref(), Some("Missouri"));
        assert_eq!(
            query.coordinates,
            Some(Coordinates {
                latitude: 37.21,
                longitude: -90.0
            })
        );
    }

    #[test]
    fn test_selected_candidate_matches_by_name() {
        let selected = SelectedCandidate::from(Suggestion::from(springfields().remove(0)));
        assert!(selected.matches(&CityQuery::parse("springfield").unwrap()));
        assert!(selected.matches(&CityQuery::parse("SPRINGFIELD, Ohio").unwrap()));
        assert!(!selected.matches(&CityQuery::parse("Chicago").unwrap()));
    }

    #[tokio::test]
    async fn test_suggest_searches_name_without_hint() {
        let api = Arc::new(FixedApi {
            searches: Mutex::new(Vec::new()),
        });
        let autocomplete = Autocomplete::new(api.clone(), 10, 5);

        let suggestions = autocomplete.suggest("Springfield, Mi").await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(*api.searches.lock(), vec!["Springfield".to_string()]);
    }

    #[tokio::test]
    async fn test_suggest_empty_input_makes_no_request() {
        let api = Arc::new(FixedApi {
            searches: Mutex::new(Vec::new()),
        });
        let autocomplete = Autocomplete::new(api.clone(), 10, 5);

        assert!(autocomplete.suggest("   ").await.unwrap().is_empty());
        assert!(autocomplete.suggest(", Ohio").await.unwrap().is_empty());
        assert!(api.searches.lock().is_empty());
    }
}
