//! Daily forecast retrieval from the Open-Meteo forecast API.
//!
//! Requests exactly one forecast day for the fields the user has enabled,
//! with the timezone auto-detected from the coordinates.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{ApiError, WeatherError};
use crate::fields::{ForecastField, PreferenceSet};
use crate::types::{Coordinates, DailyForecast};

/// Production endpoint. Tests point the client at a mock server instead.
pub const FORECAST_API_URL: &str = "https://api.open-meteo.com";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: String,
    timezone_abbreviation: Option<String>,
    #[serde(default)]
    daily_units: BTreeMap<String, String>,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<NaiveDate>,
    #[serde(flatten)]
    fields: BTreeMap<String, Vec<serde_json::Value>>,
}

/// Client for the Open-Meteo forecast service.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    forecast_url: Url,
    client: Arc<Client>,
}

impl ForecastClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(FORECAST_API_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Create a client against an arbitrary base URL (used by tests).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let forecast_url = Url::parse(base_url)
            .and_then(|u| u.join("v1/forecast"))
            .with_context(|| format!("Invalid forecast base URL: {base_url}"))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            forecast_url,
            client: Arc::new(client),
        })
    }

    /// Fetch one forecast day for the enabled fields.
    ///
    /// An all-off preference set is rejected locally before any network
    /// call. The enabled fields are projected in canonical order, so the
    /// same selection always produces the same `daily=` parameter no matter
    /// the toggle history. No retry, no caching of prior responses.
    pub async fn fetch(
        &self,
        coords: Coordinates,
        prefs: &PreferenceSet,
    ) -> Result<DailyForecast, WeatherError> {
        let fields = prefs.enabled_fields();
        if fields.is_empty() {
            return Err(WeatherError::NoFieldsSelected);
        }

        let daily = fields
            .iter()
            .map(|f| f.id())
            .collect::<Vec<_>>()
            .join(",");

        tracing::debug!(
            "Fetching forecast for ({:.4}, {:.4}): {}",
            coords.latitude,
            coords.longitude,
            daily
        );

        let response = self
            .client
            .get(self.forecast_url.clone())
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("daily", daily),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::FetchFailed(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::FetchFailed(ApiError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::FetchFailed(ApiError::Parse(e.to_string())))?;

        let values = body
            .daily
            .fields
            .into_iter()
            .filter_map(|(id, vals)| ForecastField::from_id(&id).map(|f| (f, vals)))
            .collect();

        Ok(DailyForecast {
            timezone: body.timezone,
            timezone_abbreviation: body.timezone_abbreviation,
            units: body.daily_units,
            days: body.daily.time,
            values,
        })
    }
}
