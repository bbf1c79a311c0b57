//! Data models for citycast
//!
//! - Location: queries, geocoding candidates and resolved cities
//! - Forecast: the parallel-array forecast payload and its time helpers

pub mod forecast;
pub mod location;

pub use forecast::{CurrentWeather, DailySeries, ForecastData, HourlySeries};
pub use location::{CityQuery, Coordinates, GeocodeCandidate, ResolvedCity};
