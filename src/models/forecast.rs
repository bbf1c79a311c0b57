//! Forecast data as returned by the Open-Meteo forecast endpoint
//!
//! The daily and hourly blocks are parallel arrays: entry `i` of every daily
//! field describes the same day, entry `i` of every hourly field the same hour.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CitycastError, Result};

/// Full forecast payload, replaced wholesale on every fetch
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastData {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name chosen by `timezone=auto`
    #[serde(default)]
    pub timezone: String,
    /// Offset of the location's local time from UTC
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current_weather: Option<CurrentWeather>,
    pub daily: DailySeries,
    pub hourly: HourlySeries,
}

/// `current_weather=true` block
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    pub weathercode: u16,
    #[serde(default)]
    pub time: String,
}

/// Daily aggregates, one entry per day
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DailySeries {
    pub time: Vec<String>,
    pub weathercode: Vec<Option<u16>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub sunrise: Vec<Option<String>>,
    pub sunset: Vec<Option<String>>,
    pub windspeed_10m_max: Vec<Option<f64>>,
    pub relative_humidity_2m_max: Vec<Option<f64>>,
}

/// Hourly samples, one entry per hour
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    pub weathercode: Vec<Option<u16>>,
}

impl DailySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn check_aligned(&self) -> Result<()> {
        let expected = self.time.len();
        let fields = [
            ("weathercode", self.weathercode.len()),
            ("temperature_2m_max", self.temperature_2m_max.len()),
            ("temperature_2m_min", self.temperature_2m_min.len()),
            ("sunrise", self.sunrise.len()),
            ("sunset", self.sunset.len()),
            ("windspeed_10m_max", self.windspeed_10m_max.len()),
            ("relative_humidity_2m_max", self.relative_humidity_2m_max.len()),
        ];
        check_lengths("daily", expected, &fields)
    }
}

impl HourlySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    fn check_aligned(&self) -> Result<()> {
        let expected = self.time.len();
        let fields = [
            ("temperature_2m", self.temperature_2m.len()),
            ("weathercode", self.weathercode.len()),
        ];
        check_lengths("hourly", expected, &fields)
    }
}

fn check_lengths(block: &str, expected: usize, fields: &[(&str, usize)]) -> Result<()> {
    for (field, len) in fields {
        if *len != expected {
            return Err(CitycastError::parse(format!(
                "{block}.{field} has {len} entries, expected {expected}"
            )));
        }
    }
    Ok(())
}

impl ForecastData {
    /// Reject payloads whose parallel arrays are not index-aligned
    pub fn validate(&self) -> Result<()> {
        self.daily.check_aligned()?;
        self.hourly.check_aligned()
    }

    /// Wall-clock time at the forecast location
    ///
    /// Open-Meteo reports timestamps in the location's local time when
    /// `timezone=auto`, so "now" has to be shifted the same way before comparing.
    #[must_use]
    pub fn local_now(&self, utc_now: DateTime<Utc>) -> NaiveDateTime {
        utc_now.naive_utc() + Duration::seconds(i64::from(self.utc_offset_seconds))
    }
}

/// Parse an Open-Meteo local timestamp such as `2026-02-05T14:00`
pub fn parse_local_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| CitycastError::parse(format!("Invalid datetime format: {s}")))
}

/// Parse an Open-Meteo date such as `2026-02-05`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CitycastError::parse(format!("Invalid date format: {s}")))
}
