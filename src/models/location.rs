//! Location models: user queries, geocoding candidates and resolved cities

use serde::{Deserialize, Serialize};

use crate::{CitycastError, Result};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CitycastError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CitycastError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A city lookup request, consumed once per search
#[derive(Debug, Clone, PartialEq)]
pub struct CityQuery {
    /// Free-text city name
    pub name: String,
    /// Optional state (or country) hint typed after a comma
    pub state: Option<String>,
    /// Pre-resolved coordinates; when present the geocoder is skipped
    pub coordinates: Option<Coordinates>,
}

impl CityQuery {
    /// Parse user input of the form `City` or `City, State`
    ///
    /// Only the first comma separates the state hint; anything after it is kept
    /// verbatim (trimmed). An empty hint is treated as no hint.
    pub fn parse(input: &str) -> Result<Self> {
        let (name, state) = split_state_hint(input);
        if name.is_empty() {
            return Err(CitycastError::validation("City name cannot be empty"));
        }
        Ok(Self {
            name: name.to_string(),
            state: state.map(str::to_string),
            coordinates: None,
        })
    }

    /// Build a query that already knows where the city is
    #[must_use]
    pub fn resolved(city: &ResolvedCity) -> Self {
        Self {
            name: city.name.clone(),
            state: city.state.clone(),
            coordinates: Some(city.coordinates),
        }
    }

    /// Text shown in logs and errors, e.g. "Chicago, Illinois"
    #[must_use]
    pub fn display(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}", self.name, state),
            None => self.name.clone(),
        }
    }
}

/// Split `"Chicago, Illinois"` into `("Chicago", Some("Illinois"))`
pub(crate) fn split_state_hint(input: &str) -> (&str, Option<&str>) {
    match input.split_once(',') {
        Some((name, hint)) => {
            let hint = hint.trim();
            (name.trim(), (!hint.is_empty()).then_some(hint))
        }
        None => (input.trim(), None),
    }
}

/// Candidate place returned by the geocoding search API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// State / province
    pub admin1: Option<String>,
    /// County / sub-region
    pub admin2: Option<String>,
    pub country: Option<String>,
}

impl GeocodeCandidate {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Label used in suggestion lists: "Name, Admin1, Country"
    #[must_use]
    pub fn label(&self) -> String {
        [Some(self.name.as_str()), self.admin1.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A city whose coordinates are known
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedCity {
    pub name: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub coordinates: Coordinates,
}

impl ResolvedCity {
    /// Heading for the forecast, e.g. "Chicago, Illinois"
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => format!("{}, {}", self.name, state),
            _ => self.name.clone(),
        }
    }
}

impl From<GeocodeCandidate> for ResolvedCity {
    fn from(candidate: GeocodeCandidate) -> Self {
        let coordinates = candidate.coordinates();
        Self {
            name: candidate.name,
            state: candidate.admin1,
            country: candidate.country,
            coordinates,
        }
    }
}
