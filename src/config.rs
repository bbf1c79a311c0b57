//! Configuration management for `citycast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::CitycastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `citycast`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitycastConfig {
    /// Geocoding API and disambiguation settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Forecast API settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Rendering defaults
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to do when no candidate matches the name and state exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Use the API's top-ranked candidate
    #[default]
    FirstCandidate,
    /// Fail with an ambiguous-city error
    Strict,
}

/// Geocoding API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Number of candidates requested per search
    #[serde(default = "default_candidate_count")]
    pub candidate_count: u8,
    /// Language of returned place names
    #[serde(default = "default_language")]
    pub language: String,
    /// Disambiguation fallback policy
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

/// Forecast API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Base URL of the forecast API
    #[serde(default = "default_forecast_base_url")]
    pub base_url: String,
    /// `temperature_unit` query value
    #[serde(default = "default_temperature_unit")]
    pub temperature_unit: String,
    /// `windspeed_unit` query value
    #[serde(default = "default_windspeed_unit")]
    pub windspeed_unit: String,
    /// Request timeout in seconds, applied to both APIs
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures, applied to both APIs
    #[serde(default)]
    pub max_retries: u32,
}

/// Rendering defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// City shown when none is given
    #[serde(default = "default_city")]
    pub default_city: String,
    /// Day count used when none is given (1, 3 or 7)
    #[serde(default = "default_days")]
    pub default_days: u8,
    /// Length of the hourly strip in the 1-day view
    #[serde(default = "default_hourly_hours")]
    pub hourly_hours: usize,
    /// Maximum number of autocomplete suggestions shown
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_candidate_count() -> u8 {
    10
}

fn default_language() -> String {
    "en".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_temperature_unit() -> String {
    "fahrenheit".to_string()
}

fn default_windspeed_unit() -> String {
    "mph".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_city() -> String {
    "Detroit".to_string()
}

fn default_days() -> u8 {
    3
}

fn default_hourly_hours() -> usize {
    12
}

fn default_suggestion_limit() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            candidate_count: default_candidate_count(),
            language: default_language(),
            fallback: FallbackPolicy::default(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_forecast_base_url(),
            temperature_unit: default_temperature_unit(),
            windspeed_unit: default_windspeed_unit(),
            timeout_seconds: default_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            default_days: default_days(),
            hourly_hours: default_hourly_hours(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ForecastConfig {
    /// Short unit label for temperatures, e.g. "°F"
    #[must_use]
    pub fn temperature_symbol(&self) -> &'static str {
        match self.temperature_unit.as_str() {
            "celsius" => "°C",
            _ => "°F",
        }
    }

    /// Unit label for wind speeds, e.g. "mph"
    #[must_use]
    pub fn windspeed_label(&self) -> &'static str {
        match self.windspeed_unit.as_str() {
            "kmh" => "km/h",
            "ms" => "m/s",
            "kn" => "kn",
            _ => "mph",
        }
    }
}

impl CitycastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicit path must exist; the default location is optional
        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path.clone())
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(path) = Self::get_config_path().filter(|p| p.exists()) {
                    builder = builder.add_source(
                        File::from(path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // CITYCAST_FORECAST__TIMEOUT_SECONDS=10 overrides forecast.timeout_seconds
        builder = builder.add_source(
            Environment::with_prefix("CITYCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: CitycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("citycast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=100).contains(&self.geocoding.candidate_count) {
            return Err(
                CitycastError::config("Geocoding candidate count must be between 1 and 100")
                    .into(),
            );
        }

        if !(1..=300).contains(&self.forecast.timeout_seconds) {
            return Err(CitycastError::config(
                "Request timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.forecast.max_retries > 10 {
            return Err(CitycastError::config("Max retries cannot exceed 10").into());
        }

        if ![1, 3, 7].contains(&self.display.default_days) {
            return Err(CitycastError::config("Default days must be 1, 3 or 7").into());
        }

        if !(1..=48).contains(&self.display.hourly_hours) {
            return Err(CitycastError::config("Hourly hours must be between 1 and 48").into());
        }

        if !(1..=10).contains(&self.display.suggestion_limit) {
            return Err(
                CitycastError::config("Suggestion limit must be between 1 and 10").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CitycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CitycastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_temperature_units = ["fahrenheit", "celsius"];
        if !valid_temperature_units.contains(&self.forecast.temperature_unit.as_str()) {
            return Err(CitycastError::config(format!(
                "Invalid temperature unit '{}'. Must be one of: {}",
                self.forecast.temperature_unit,
                valid_temperature_units.join(", ")
            ))
            .into());
        }

        let valid_windspeed_units = ["mph", "kmh", "ms", "kn"];
        if !valid_windspeed_units.contains(&self.forecast.windspeed_unit.as_str()) {
            return Err(CitycastError::config(format!(
                "Invalid windspeed unit '{}'. Must be one of: {}",
                self.forecast.windspeed_unit,
                valid_windspeed_units.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Forecast", &self.forecast.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(CitycastError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.display.default_city.trim().is_empty() {
            return Err(CitycastError::config("Default city cannot be empty").into());
        }

        Ok(())
    }
}
