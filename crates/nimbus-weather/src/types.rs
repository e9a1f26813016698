use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fields::ForecastField;

/// Geographic coordinates in decimal degrees.
///
/// Produced only by the geocoder; never user-edited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside the valid
    /// latitude [-90, 90] / longitude [-180, 180] ranges.
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        (lat_ok && lon_ok).then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// A resolved place: the coordinates plus what the geocoder matched,
/// so the UI can echo the interpretation of the user's query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: Option<String>,
    pub coords: Coordinates,
}

/// One day of forecast data, restricted to the requested fields.
///
/// Values are kept exactly as the provider returned them: one entry per
/// forecast day (a single entry here) per field, no unit conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    /// IANA timezone the provider resolved from the coordinates.
    pub timezone: String,
    pub timezone_abbreviation: Option<String>,
    /// Unit per response key, passed through unmodified.
    pub units: BTreeMap<String, String>,
    /// The forecast day axis.
    pub days: Vec<NaiveDate>,
    /// Per-field daily values, keyed in canonical field order.
    pub values: BTreeMap<ForecastField, Vec<serde_json::Value>>,
}

impl DailyForecast {
    /// The daily values for one field, if it was requested and returned.
    pub fn field(&self, field: ForecastField) -> Option<&[serde_json::Value]> {
        self.values.get(&field).map(Vec::as_slice)
    }

    /// The unit string the provider reported for a field, if any.
    pub fn unit(&self, field: ForecastField) -> Option<&str> {
        self.units.get(field.id()).map(String::as_str)
    }
}
