//! The closed enumeration of daily forecast fields and the user's boolean
//! selection over it.
//!
//! Field identifiers match the Open-Meteo daily schema verbatim; the enum's
//! declaration order is the canonical order used when building request
//! parameters, so identical selections always produce identical requests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One daily forecast quantity, named by its Open-Meteo identifier.
///
/// Variant order is canonical and load-bearing: `PreferenceSet` projections
/// and the `daily=` request parameter follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ForecastField {
    WeatherCode,
    Temperature2mMax,
    Temperature2mMin,
    ApparentTemperatureMax,
    ApparentTemperatureMin,
    Sunrise,
    Sunset,
    DaylightDuration,
    SunshineDuration,
    UvIndexMax,
    PrecipitationSum,
    RainSum,
    ShowersSum,
    SnowfallSum,
    PrecipitationHours,
    PrecipitationProbabilityMax,
    WindSpeed10mMax,
    WindGusts10mMax,
    WindDirection10mDominant,
}

impl ForecastField {
    /// Every field, in canonical order.
    pub const ALL: [ForecastField; 19] = [
        ForecastField::WeatherCode,
        ForecastField::Temperature2mMax,
        ForecastField::Temperature2mMin,
        ForecastField::ApparentTemperatureMax,
        ForecastField::ApparentTemperatureMin,
        ForecastField::Sunrise,
        ForecastField::Sunset,
        ForecastField::DaylightDuration,
        ForecastField::SunshineDuration,
        ForecastField::UvIndexMax,
        ForecastField::PrecipitationSum,
        ForecastField::RainSum,
        ForecastField::ShowersSum,
        ForecastField::SnowfallSum,
        ForecastField::PrecipitationHours,
        ForecastField::PrecipitationProbabilityMax,
        ForecastField::WindSpeed10mMax,
        ForecastField::WindGusts10mMax,
        ForecastField::WindDirection10mDominant,
    ];

    /// The provider-facing identifier (request parameter and response key).
    pub fn id(self) -> &'static str {
        match self {
            ForecastField::WeatherCode => "weather_code",
            ForecastField::Temperature2mMax => "temperature_2m_max",
            ForecastField::Temperature2mMin => "temperature_2m_min",
            ForecastField::ApparentTemperatureMax => "apparent_temperature_max",
            ForecastField::ApparentTemperatureMin => "apparent_temperature_min",
            ForecastField::Sunrise => "sunrise",
            ForecastField::Sunset => "sunset",
            ForecastField::DaylightDuration => "daylight_duration",
            ForecastField::SunshineDuration => "sunshine_duration",
            ForecastField::UvIndexMax => "uv_index_max",
            ForecastField::PrecipitationSum => "precipitation_sum",
            ForecastField::RainSum => "rain_sum",
            ForecastField::ShowersSum => "showers_sum",
            ForecastField::SnowfallSum => "snowfall_sum",
            ForecastField::PrecipitationHours => "precipitation_hours",
            ForecastField::PrecipitationProbabilityMax => "precipitation_probability_max",
            ForecastField::WindSpeed10mMax => "wind_speed_10m_max",
            ForecastField::WindGusts10mMax => "wind_gusts_10m_max",
            ForecastField::WindDirection10mDominant => "wind_direction_10m_dominant",
        }
    }

    /// Parse a provider identifier. Unknown identifiers return `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }

    /// Human-readable label for display next to a toggle.
    pub fn label(self) -> &'static str {
        match self {
            ForecastField::WeatherCode => "Weather Code",
            ForecastField::Temperature2mMax => "Max Temperature",
            ForecastField::Temperature2mMin => "Min Temperature",
            ForecastField::ApparentTemperatureMax => "Apparent Max Temperature",
            ForecastField::ApparentTemperatureMin => "Apparent Min Temperature",
            ForecastField::Sunrise => "Sunrise",
            ForecastField::Sunset => "Sunset",
            ForecastField::DaylightDuration => "Daylight Duration",
            ForecastField::SunshineDuration => "Sunshine Duration",
            ForecastField::UvIndexMax => "Max UV Index",
            ForecastField::PrecipitationSum => "Precipitation",
            ForecastField::RainSum => "Rain",
            ForecastField::ShowersSum => "Showers",
            ForecastField::SnowfallSum => "Snowfall",
            ForecastField::PrecipitationHours => "Precipitation Hours",
            ForecastField::PrecipitationProbabilityMax => "Precipitation Probability",
            ForecastField::WindSpeed10mMax => "Max Wind Speed",
            ForecastField::WindGusts10mMax => "Max Wind Gusts",
            ForecastField::WindDirection10mDominant => "Dominant Wind Direction",
        }
    }
}

/// The user's boolean selection over [`ForecastField::ALL`].
///
/// Serialized as a JSON object of identifier → bool with every key present.
/// On deserialization missing keys read as `false` and unknown keys are
/// ignored, so stored data from older revisions loads without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, bool>",
    into = "BTreeMap<&'static str, bool>"
)]
pub struct PreferenceSet {
    enabled: BTreeSet<ForecastField>,
}

impl PreferenceSet {
    /// A set with every field disabled.
    pub fn empty() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    /// A set containing exactly the given fields.
    pub fn from_fields(fields: impl IntoIterator<Item = ForecastField>) -> Self {
        Self {
            enabled: fields.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self, field: ForecastField) -> bool {
        self.enabled.contains(&field)
    }

    /// Returns a new set with exactly one flag flipped.
    pub fn toggle(&self, field: ForecastField) -> Self {
        let mut next = self.clone();
        if !next.enabled.remove(&field) {
            next.enabled.insert(field);
        }
        next
    }

    /// The enabled fields in canonical order, independent of toggle history.
    pub fn enabled_fields(&self) -> Vec<ForecastField> {
        ForecastField::ALL
            .into_iter()
            .filter(|f| self.enabled.contains(f))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

impl Default for PreferenceSet {
    /// Every field enabled, matching the application's documented default.
    fn default() -> Self {
        Self::from_fields(ForecastField::ALL)
    }
}

impl From<BTreeMap<String, bool>> for PreferenceSet {
    fn from(map: BTreeMap<String, bool>) -> Self {
        let enabled = map
            .into_iter()
            .filter(|(_, on)| *on)
            .filter_map(|(id, _)| ForecastField::from_id(&id))
            .collect();
        Self { enabled }
    }
}

impl From<PreferenceSet> for BTreeMap<&'static str, bool> {
    fn from(set: PreferenceSet) -> Self {
        ForecastField::ALL
            .into_iter()
            .map(|f| (f.id(), set.is_enabled(f)))
            .collect()
    }
}
