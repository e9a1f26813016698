//! Forward geocoding: convert a free-text place name to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{ApiError, WeatherError};
use crate::types::{Coordinates, Place};

/// Production endpoint. Tests point the client at a mock server instead.
pub const GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodeHit>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

/// Client for the Open-Meteo geocoding service.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    search_url: Url,
    client: Arc<Client>,
}

impl GeocodeClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(GEOCODING_API_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Create a client against an arbitrary base URL (used by tests).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let search_url = Url::parse(base_url)
            .and_then(|u| u.join("v1/search"))
            .with_context(|| format!("Invalid geocoding base URL: {base_url}"))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            search_url,
            client: Arc::new(client),
        })
    }

    /// Resolve a place name to its best-matching location.
    ///
    /// The query is trimmed first; an empty query is rejected locally
    /// without touching the network. Exactly one match is requested and
    /// every call is a fresh lookup - no retry, no caching.
    pub async fn resolve(&self, query: &str) -> Result<Place, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        tracing::debug!("Geocoding location name: {}", query);

        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[
                ("name", query),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::ResolutionFailed(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::ResolutionFailed(ApiError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::ResolutionFailed(ApiError::Parse(e.to_string())))?;

        let Some(hit) = body.results.unwrap_or_default().into_iter().next() else {
            return Err(WeatherError::NotFound(query.to_string()));
        };

        let Some(coords) = Coordinates::checked(hit.latitude, hit.longitude) else {
            return Err(WeatherError::ResolutionFailed(ApiError::Parse(format!(
                "coordinates out of range: {}, {}",
                hit.latitude, hit.longitude
            ))));
        };

        tracing::info!(
            "Resolved \"{}\" to {} ({:.4}, {:.4})",
            query,
            hit.name,
            coords.latitude,
            coords.longitude
        );

        Ok(Place {
            name: hit.name,
            country: hit.country,
            coords,
        })
    }
}
