//! Forecast rendering into a backend-neutral view model
//!
//! [`render_forecast`] is a pure function: the same forecast, city, day count
//! and reference time always produce the same [`ForecastView`]. Terminal and
//! JSON output are built on top of the view, see [`crate::display`].

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::{DisplayConfig, ForecastConfig};
use crate::models::forecast::{parse_date, parse_local_datetime};
use crate::models::{ForecastData, ResolvedCity};
use crate::weather_codes;
use crate::{CitycastError, Result};

/// Cards in the top row of the 7-day layout
const SEVEN_DAY_TOP_ROW: usize = 3;

/// Supported view lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayCount {
    One,
    Three,
    Seven,
}

impl DayCount {
    #[must_use]
    pub fn days(self) -> usize {
        match self {
            DayCount::One => 1,
            DayCount::Three => 3,
            DayCount::Seven => 7,
        }
    }
}

impl TryFrom<u8> for DayCount {
    type Error = CitycastError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(DayCount::One),
            3 => Ok(DayCount::Three),
            7 => Ok(DayCount::Seven),
            other => Err(CitycastError::validation(format!(
                "days must be 1, 3 or 7, got: {other}"
            ))),
        }
    }
}

impl From<DayCount> for u8 {
    fn from(value: DayCount) -> Self {
        match value {
            DayCount::One => 1,
            DayCount::Three => 3,
            DayCount::Seven => 7,
        }
    }
}

impl FromStr for DayCount {
    type Err = CitycastError;

    fn from_str(s: &str) -> Result<Self> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| CitycastError::validation(format!("days must be 1, 3 or 7, got: {s}")))?;
        value.try_into()
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

/// Unit labels and strip length used while rendering
#[derive(Debug, Clone, Serialize)]
pub struct RenderOptions {
    pub hourly_hours: usize,
    pub temperature_unit: String,
    pub wind_unit: String,
}

impl RenderOptions {
    #[must_use]
    pub fn from_config(forecast: &ForecastConfig, display: &DisplayConfig) -> Self {
        Self {
            hourly_hours: display.hourly_hours,
            temperature_unit: forecast.temperature_symbol().to_string(),
            wind_unit: forecast.windspeed_label().to_string(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default(), &DisplayConfig::default())
    }
}

/// Everything a backend needs to draw one forecast
#[derive(Debug, Clone, Serialize)]
pub struct ForecastView {
    pub city: String,
    pub days: DayCount,
    pub temperature_unit: String,
    pub wind_unit: String,
    pub current: Option<CurrentSummary>,
    /// One row for 1/3-day views; a 3-card and a 4-card row for the 7-day view
    pub rows: Vec<Vec<DayCard>>,
}

impl ForecastView {
    /// All cards in day order, regardless of row layout
    pub fn cards(&self) -> impl Iterator<Item = &DayCard> {
        self.rows.iter().flatten()
    }
}

/// Current conditions shown above the cards
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSummary {
    pub temperature: i64,
    pub description: String,
    pub icon: String,
    pub wind: String,
}

/// One day's card
#[derive(Debug, Clone, Serialize)]
pub struct DayCard {
    pub date: NaiveDate,
    /// Short weekday, e.g. "Mon"
    pub day_name: String,
    pub icon: Option<String>,
    pub description: String,
    pub high: Option<i64>,
    pub low: Option<i64>,
    pub detail: CardDetail,
}

/// Extra card content, depending on the view length
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardDetail {
    /// 7-day view: summary only
    Summary,
    /// 3-day view
    Conditions {
        wind: Option<String>,
        humidity: Option<f64>,
    },
    /// 1-day view
    Full {
        sunrise: Option<String>,
        sunset: Option<String>,
        wind: Option<String>,
        humidity: Option<f64>,
        hourly: Vec<HourlyEntry>,
    },
}

/// One slot of the hourly strip
#[derive(Debug, Clone, Serialize)]
pub struct HourlyEntry {
    pub time: NaiveDateTime,
    /// e.g. "3 PM"
    pub label: String,
    pub icon: Option<String>,
    pub temperature: Option<i64>,
}

/// Build the view for `days` days of `data`
///
/// `now` is the wall-clock time at the forecast location; the hourly strip of
/// the 1-day view starts at the first hour strictly after it.
pub fn render_forecast(
    data: &ForecastData,
    city: &ResolvedCity,
    days: DayCount,
    now: NaiveDateTime,
    options: &RenderOptions,
) -> Result<ForecastView> {
    data.validate()?;
    let wanted = days.days();
    if data.daily.len() < wanted {
        return Err(CitycastError::parse(format!(
            "forecast has {} days, {} requested",
            data.daily.len(),
            wanted
        )));
    }

    let hourly = match days {
        DayCount::One => hourly_strip(data, now, options.hourly_hours)?,
        DayCount::Three | DayCount::Seven => Vec::new(),
    };

    let mut cards = Vec::with_capacity(wanted);
    for index in 0..wanted {
        cards.push(day_card(data, index, days, &hourly)?);
    }

    let rows = match days {
        DayCount::Seven => {
            let bottom = cards.split_off(SEVEN_DAY_TOP_ROW);
            vec![cards, bottom]
        }
        DayCount::One | DayCount::Three => vec![cards],
    };

    let current = data.current_weather.as_ref().map(|c| CurrentSummary {
        temperature: round_half_up(c.temperature),
        description: weather_codes::describe(c.weathercode).to_string(),
        icon: weather_codes::icon_file(c.weathercode),
        wind: format!("{:.1}", c.windspeed),
    });

    Ok(ForecastView {
        city: city.display_name(),
        days,
        temperature_unit: options.temperature_unit.clone(),
        wind_unit: options.wind_unit.clone(),
        current,
        rows,
    })
}

fn day_card(
    data: &ForecastData,
    index: usize,
    days: DayCount,
    hourly: &[HourlyEntry],
) -> Result<DayCard> {
    let daily = &data.daily;
    let date = parse_date(&daily.time[index])?;
    let code = daily.weathercode[index];
    let wind = daily.windspeed_10m_max[index].map(|w| format!("{w:.1}"));
    let humidity = daily.relative_humidity_2m_max[index];

    let detail = match days {
        DayCount::One => CardDetail::Full {
            sunrise: clock_time(daily.sunrise[index].as_deref())?,
            sunset: clock_time(daily.sunset[index].as_deref())?,
            wind,
            humidity,
            hourly: hourly.to_vec(),
        },
        DayCount::Three => CardDetail::Conditions { wind, humidity },
        DayCount::Seven => CardDetail::Summary,
    };

    Ok(DayCard {
        date,
        day_name: date.format("%a").to_string(),
        icon: code.map(weather_codes::icon_file),
        description: code.map_or("Unknown", weather_codes::describe).to_string(),
        high: daily.temperature_2m_max[index].map(round_half_up),
        low: daily.temperature_2m_min[index].map(round_half_up),
        detail,
    })
}

fn hourly_strip(data: &ForecastData, now: NaiveDateTime, hours: usize) -> Result<Vec<HourlyEntry>> {
    let times = data
        .hourly
        .time
        .iter()
        .map(|t| parse_local_datetime(t))
        .collect::<Result<Vec<_>>>()?;

    let entries = hourly_window(&times, now, hours)
        .map(|i| {
            let code = data.hourly.weathercode[i];
            HourlyEntry {
                time: times[i],
                label: times[i].format("%-I %p").to_string(),
                icon: code.map(weather_codes::icon_file),
                temperature: data.hourly.temperature_2m[i].map(round_half_up),
            }
        })
        .collect();

    Ok(entries)
}

/// Indices of the next `len` hours after `now`
///
/// Starts at the first timestamp strictly greater than `now` and holds
/// `min(len, remaining)` entries. Empty when no timestamp lies after `now`.
#[must_use]
pub fn hourly_window(times: &[NaiveDateTime], now: NaiveDateTime, len: usize) -> Range<usize> {
    match times.iter().position(|t| *t > now) {
        Some(start) => start..times.len().min(start + len),
        None => times.len()..times.len(),
    }
}

/// 12-hour clock time, e.g. "7:05 AM"
fn clock_time(value: Option<&str>) -> Result<Option<String>> {
    value
        .map(|s| parse_local_datetime(s).map(|dt| dt.format("%-I:%M %p").to_string()))
        .transpose()
}

/// Round to the nearest integer, halves towards positive infinity
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    // `(value + 0.5).floor()` rounds 0.49999999999999994 up
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}
