//! Error types and handling for `citycast`

use thiserror::Error;

/// Main error type for the `citycast` library
#[derive(Error, Debug)]
pub enum CitycastError {
    /// The geocoder returned no candidates for the query
    #[error("City not found: {query}")]
    CityNotFound { query: String },

    /// Several candidates matched but none exactly, and the strict policy is active
    #[error("Ambiguous city '{query}': {candidates} candidates, none matching exactly")]
    AmbiguousCity { query: String, candidates: usize },

    /// Network or HTTP status failures talking to Open-Meteo
    #[error("API error: {message}")]
    Api { message: String },

    /// Malformed or inconsistent response data
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CitycastError {
    /// Create a new city-not-found error
    pub fn city_not_found<S: Into<String>>(query: S) -> Self {
        Self::CityNotFound {
            query: query.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CitycastError::CityNotFound { .. } => "City not found. Please try again.".to_string(),
            CitycastError::AmbiguousCity { query, candidates } => format!(
                "None of the {candidates} places found for '{query}' match exactly. Try a different state or country."
            ),
            CitycastError::Api { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            CitycastError::Parse { .. } => {
                "The weather service returned data that could not be read.".to_string()
            }
            CitycastError::Validation { message } => format!("Invalid input: {message}"),
            CitycastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            CitycastError::Io { .. } => "Could not write output.".to_string(),
        }
    }
}

impl From<reqwest::Error> for CitycastError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::parse(err.to_string())
        } else {
            Self::api(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for CitycastError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Self::api(e.to_string()),
        }
    }
}
