//! Open-Meteo API client
//!
//! This module provides the HTTP side of citycast: the geocoding search used by
//! the geocoder and autocomplete, and the forecast fetch. Both endpoints are
//! API-key free. Requests share one client with a timeout and an optional
//! transient-retry policy.

use crate::config::{CitycastConfig, ForecastConfig, GeocodingConfig};
use crate::models::{Coordinates, ForecastData, GeocodeCandidate};
use crate::{CitycastError, Result};
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode,sunrise,sunset,windspeed_10m_max,relative_humidity_2m_max";
const HOURLY_FIELDS: &str = "temperature_2m,weathercode";

/// Everything citycast needs from a weather backend
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Search places by name, returning at most `count` candidates in relevance order
    async fn search(&self, name: &str, count: u8) -> Result<Vec<GeocodeCandidate>>;

    /// Fetch current, hourly and daily forecast data for a coordinate pair
    async fn forecast(&self, coordinates: Coordinates) -> Result<ForecastData>;
}

/// Geocoding response from `OpenMeteo`; `results` is absent when nothing matched
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodeCandidate>>,
}

/// HTTP client for the Open-Meteo geocoding and forecast APIs
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    geocoding: GeocodingConfig,
    forecast: ForecastConfig,
}

impl OpenMeteoClient {
    /// Create a new client from the loaded configuration
    pub fn new(config: &CitycastConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.forecast.timeout_seconds.into());

        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("citycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CitycastError::api(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.forecast.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            geocoding: config.geocoding.clone(),
            forecast: config.forecast.clone(),
        })
    }

    fn search_url(&self, name: &str, count: u8) -> String {
        format!(
            "{}/search?name={}&count={}&language={}&format=json",
            self.geocoding.base_url.trim_end_matches('/'),
            urlencoding::encode(name),
            count,
            urlencoding::encode(&self.geocoding.language),
        )
    }

    fn forecast_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current_weather=true&hourly={}&daily={}&temperature_unit={}&windspeed_unit={}&timezone=auto",
            self.forecast.base_url.trim_end_matches('/'),
            coordinates.latitude,
            coordinates.longitude,
            HOURLY_FIELDS,
            DAILY_FIELDS,
            self.forecast.temperature_unit,
            self.forecast.windspeed_unit,
        )
    }

    /// GET a URL and decode the JSON body, mapping HTTP failures to `Api` errors
    #[instrument(level = "debug", skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error after {:.3}s: {}", start_time.elapsed().as_secs_f64(), e);
            CitycastError::from(e)
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CitycastError::api("Rate limit exceeded (HTTP 429)"));
        }
        if status.is_server_error() {
            return Err(CitycastError::api(format!("Service unavailable (HTTP {status})")));
        }
        if !status.is_success() {
            return Err(CitycastError::api(format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body = response.json::<T>().await.map_err(|e| {
            error!("Failed to parse response body: {}", e);
            CitycastError::parse(e.to_string())
        })?;

        let total_duration = start_time.elapsed();
        if total_duration.as_secs() > 5 {
            warn!("Slow API response: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherApi for OpenMeteoClient {
    #[instrument(skip(self), fields(location = name))]
    async fn search(&self, name: &str, count: u8) -> Result<Vec<GeocodeCandidate>> {
        info!("Geocoding location: '{}'", name);
        let start_time = Instant::now();

        let response: GeocodingResponse = self.get_json(&self.search_url(name, count)).await?;
        let candidates = response.results.unwrap_or_default();

        if candidates.is_empty() {
            warn!("No results found for location '{}'", name);
        } else {
            info!(
                "Found {} geocoding results for '{}' in {:.3}s",
                candidates.len(),
                name,
                start_time.elapsed().as_secs_f64()
            );
            debug!(
                "Geocoding results: {:?}",
                candidates.iter().map(GeocodeCandidate::label).collect::<Vec<_>>()
            );
        }

        Ok(candidates)
    }

    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn forecast(&self, coordinates: Coordinates) -> Result<ForecastData> {
        info!("Getting 7-day forecast for coordinates: {}", coordinates.format());
        let start_time = Instant::now();

        let data: ForecastData = self.get_json(&self.forecast_url(coordinates)).await?;
        data.validate()?;

        info!(
            "Retrieved forecast with {} days and {} hours in {:.3}s",
            data.daily.len(),
            data.hourly.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(data)
    }
}
