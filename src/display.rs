//! Terminal rendering of forecast views and suggestion lists

use std::io::Write;

use crate::Result;
use crate::autocomplete::Suggestion;
use crate::render::{CardDetail, DayCard, ForecastView};

const MISSING: &str = "--";

/// Output style for the terminal backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Write a view in the requested format
pub fn write_view<W: Write>(out: &mut W, view: &ForecastView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, view),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, view)
                .map_err(|e| crate::CitycastError::parse(e.to_string()))?;
            writeln!(out)?;
            Ok(())
        }
    }
}

/// Human-readable rendering: header, current conditions, then one block per card
pub fn write_text<W: Write>(out: &mut W, view: &ForecastView) -> Result<()> {
    writeln!(out, "{}", view.city)?;
    writeln!(out, "{}", "=".repeat(view.city.chars().count()))?;

    if let Some(current) = &view.current {
        writeln!(
            out,
            "Now: {}{} [{}] {}, wind {} {}",
            current.temperature,
            view.temperature_unit,
            current.icon,
            current.description,
            current.wind,
            view.wind_unit
        )?;
    }

    for (row_index, row) in view.rows.iter().enumerate() {
        if row_index > 0 {
            writeln!(out, "{}", "-".repeat(40))?;
        }
        for card in row {
            writeln!(out)?;
            write_card(out, card, view)?;
        }
    }

    Ok(())
}

fn write_card<W: Write>(out: &mut W, card: &DayCard, view: &ForecastView) -> Result<()> {
    writeln!(
        out,
        "{} {}  [{}] {}  H: {}° | L: {}°",
        card.day_name,
        card.date.format("%b %-d"),
        card.icon.as_deref().unwrap_or(MISSING),
        card.description,
        or_missing(card.high),
        or_missing(card.low),
    )?;

    match &card.detail {
        CardDetail::Summary => {}
        CardDetail::Conditions { wind, humidity } => {
            write_conditions(out, wind.as_deref(), *humidity, &view.wind_unit)?;
        }
        CardDetail::Full {
            sunrise,
            sunset,
            wind,
            humidity,
            hourly,
        } => {
            writeln!(
                out,
                "  Sunrise: {}  Sunset: {}",
                sunrise.as_deref().unwrap_or(MISSING),
                sunset.as_deref().unwrap_or(MISSING)
            )?;
            write_conditions(out, wind.as_deref(), *humidity, &view.wind_unit)?;

            writeln!(out, "  Hourly Forecast")?;
            if hourly.is_empty() {
                writeln!(out, "    (no upcoming hours)")?;
            }
            for entry in hourly {
                writeln!(
                    out,
                    "    {:>5}  [{}] {}°",
                    entry.label,
                    entry.icon.as_deref().unwrap_or(MISSING),
                    or_missing(entry.temperature)
                )?;
            }
        }
    }

    Ok(())
}

fn write_conditions<W: Write>(
    out: &mut W,
    wind: Option<&str>,
    humidity: Option<f64>,
    wind_unit: &str,
) -> Result<()> {
    let wind = wind.map_or_else(|| MISSING.to_string(), |w| format!("{w} {wind_unit}"));
    writeln!(out, "  Wind: {}  Humidity: {}%", wind, or_missing(humidity))?;
    Ok(())
}

/// Numbered suggestion list, 1-based
pub fn write_suggestions<W: Write>(out: &mut W, suggestions: &[Suggestion]) -> Result<()> {
    if suggestions.is_empty() {
        writeln!(out, "No matching places.")?;
    }
    for (i, suggestion) in suggestions.iter().enumerate() {
        writeln!(out, "  #{} {}", i + 1, suggestion.label)?;
    }
    Ok(())
}

fn or_missing<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}
