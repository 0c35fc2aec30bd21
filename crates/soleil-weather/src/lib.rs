//! Hourly weather for sunlight queries
//!
//! Forecasts come from Open-Meteo and are cached per grid cell and date.
//! Callers that must not fail on weather use
//! [`WeatherCache::lookup_or_default`], which degrades to an empty day.

pub mod cache;
pub mod openmeteo;

pub use cache::*;
pub use openmeteo::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Malformed forecast: {0}")]
    Malformed(String),
}

pub type WeatherResult<T> = Result<T, WeatherError>;
