//! `citycast` - City weather lookup on top of the Open-Meteo APIs
//!
//! This library resolves free-text city names to coordinates, fetches
//! forecasts and turns them into backend-independent views for 1, 3 or 7
//! days, plus place suggestions for partially typed input.

pub mod api;
pub mod autocomplete;
pub mod config;
pub mod display;
pub mod error;
pub mod geocoder;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod weather_codes;

// Re-export core types for public API
pub use api::{OpenMeteoClient, WeatherApi};
pub use autocomplete::{Autocomplete, SelectedCandidate, Suggestion};
pub use config::{CitycastConfig, FallbackPolicy};
pub use error::CitycastError;
pub use geocoder::{Geocoder, MatchKind};
pub use models::{CityQuery, Coordinates, ForecastData, GeocodeCandidate, ResolvedCity};
pub use orchestrator::{ForecastOrchestrator, SearchContext, SearchOutcome};
pub use render::{DayCount, ForecastView, RenderOptions, render_forecast};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CitycastError>;
