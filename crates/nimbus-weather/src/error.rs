//! Error types for the weather pipeline.
//!
//! Validation errors are raised before any network traffic; the remaining
//! variants say which stage failed and carry the underlying cause so the UI
//! can render a specific message.

use thiserror::Error;

/// Failure of a single HTTP call to an external weather service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Parse(String),
}

/// Weather pipeline errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Location query was empty after trimming. Raised locally.
    #[error("location query is empty")]
    EmptyQuery,

    /// Every forecast field is toggled off. Raised locally.
    #[error("no forecast fields selected")]
    NoFieldsSelected,

    /// Geocoding succeeded but matched nothing.
    #[error("no match found for \"{0}\"")]
    NotFound(String),

    #[error("geocoding request failed: {0}")]
    ResolutionFailed(#[source] ApiError),

    #[error("forecast request failed: {0}")]
    FetchFailed(#[source] ApiError),
}

impl WeatherError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::EmptyQuery => "Enter a location to search for.",
            WeatherError::NoFieldsSelected => "Select at least one forecast field.",
            WeatherError::NotFound(_) => "Location not found. Check and try again.",
            WeatherError::ResolutionFailed(_) => {
                "Could not look up that location. Please try again."
            }
            WeatherError::FetchFailed(_) => "Weather service error. Please try again.",
        }
    }
}
