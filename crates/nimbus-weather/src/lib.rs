//! Weather lookup for Nimbus
//!
//! Geocodes free-text place names and fetches one-day daily forecasts from
//! the Open-Meteo API, restricted to the fields the user has toggled on.

pub mod error;
pub mod fields;
pub mod forecast;
pub mod geocode;
pub mod types;

pub use error::{ApiError, WeatherError};
pub use fields::{ForecastField, PreferenceSet};
pub use forecast::ForecastClient;
pub use geocode::GeocodeClient;
pub use types::{Coordinates, DailyForecast, Place};
