//! City resolution
//!
//! Turns a [`CityQuery`] into a [`ResolvedCity`]. Queries that already carry
//! coordinates (an accepted autocomplete suggestion) pass straight through;
//! everything else goes to the geocoding search and is disambiguated by the
//! state hint.

use std::sync::Arc;

use tracing::debug;

use crate::api::WeatherApi;
use crate::config::{FallbackPolicy, GeocodingConfig};
use crate::models::{CityQuery, GeocodeCandidate, ResolvedCity};
use crate::{CitycastError, Result};

/// How a candidate was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Name and `admin1` both matched the query
    NameAndState,
    /// Name matched and the hint matched the country instead
    NameAndCountry,
    /// No exact match; the API's top-ranked candidate
    FirstCandidate,
}

/// Resolves free-text city queries to coordinates
#[derive(Clone)]
pub struct Geocoder {
    api: Arc<dyn WeatherApi>,
    candidate_count: u8,
    policy: FallbackPolicy,
}

impl Geocoder {
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>, config: &GeocodingConfig) -> Self {
        Self {
            api,
            candidate_count: config.candidate_count,
            policy: config.fallback,
        }
    }

    /// Resolve a query, skipping the network when coordinates are already known
    pub async fn resolve(&self, query: &CityQuery) -> Result<ResolvedCity> {
        if let Some(coordinates) = query.coordinates {
            debug!(
                "Using pre-resolved coordinates for {}: {}",
                query.display(),
                coordinates.format()
            );
            return Ok(ResolvedCity {
                name: query.name.clone(),
                state: query.state.clone(),
                country: None,
                coordinates,
            });
        }

        let candidates = self.api.search(&query.name, self.candidate_count).await?;
        if candidates.is_empty() {
            return Err(CitycastError::city_not_found(query.display()));
        }

        let total = candidates.len();
        let (candidate, kind) = select_candidate(candidates, query, self.policy).ok_or_else(|| {
            CitycastError::AmbiguousCity {
                query: query.display(),
                candidates: total,
            }
        })?;

        debug!(
            "Resolved '{}' to {} ({}) via {:?}",
            query.display(),
            candidate.label(),
            candidate.coordinates().format(),
            kind
        );

        Ok(candidate.into())
    }
}

/// Pick the best candidate for a query
///
/// An exact case-insensitive match on name and state wins, then name and
/// country. Otherwise the first candidate is used under
/// [`FallbackPolicy::FirstCandidate`] and `None` is returned under
/// [`FallbackPolicy::Strict`]. A query without a state hint is satisfied by the
/// first candidate under either policy.
pub fn select_candidate(
    candidates: Vec<GeocodeCandidate>,
    query: &CityQuery,
    policy: FallbackPolicy,
) -> Option<(GeocodeCandidate, MatchKind)> {
    let Some(state) = query.state.as_deref() else {
        return candidates
            .into_iter()
            .next()
            .map(|c| (c, MatchKind::FirstCandidate));
    };

    let name_matches = |c: &GeocodeCandidate| same_text(&c.name, &query.name);
    let field_matches =
        |field: &Option<String>| field.as_deref().is_some_and(|value| same_text(value, state));

    let position = candidates
        .iter()
        .position(|c| name_matches(c) && field_matches(&c.admin1))
        .map(|i| (i, MatchKind::NameAndState))
        .or_else(|| {
            candidates
                .iter()
                .position(|c| name_matches(c) && field_matches(&c.country))
                .map(|i| (i, MatchKind::NameAndCountry))
        })
        .or(match policy {
            FallbackPolicy::FirstCandidate if !candidates.is_empty() => {
                Some((0, MatchKind::FirstCandidate))
            }
            _ => None,
        })?;

    let (index, kind) = position;
    candidates.into_iter().nth(index).map(|c| (c, kind))
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
