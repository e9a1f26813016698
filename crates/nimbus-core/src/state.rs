//! Application state as an explicit value plus a pure reducer.
//!
//! Every user action and run completion is an [`Event`]; [`update`] maps the
//! current state and an event to the next state. Each resolve-then-fetch run
//! carries a monotonically increasing [`RunId`], and any transition from a
//! run that is no longer the latest issued one is discarded, so a slow run
//! can never overwrite a newer run's result.

use nimbus_weather::{DailyForecast, ForecastField, Place, PreferenceSet};

use crate::error::AppError;

/// Sequence number of one pipeline run. Monotonically increasing.
pub type RunId = u64;

/// Phase of the latest pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Resolving,
    Fetching,
    Ready,
    Failed,
}

/// Everything the UI needs to render, as a single cloneable value.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The user's location query, exactly as entered (trimmed).
    pub query: String,
    /// The user's forecast field selection.
    pub prefs: PreferenceSet,
    /// Where the latest resolution landed, kept so preference toggles can
    /// refetch without a fresh geocoding call.
    pub place: Option<Place>,
    /// The latest successfully fetched forecast.
    pub forecast: Option<DailyForecast>,
    pub phase: RunPhase,
    /// User-visible description of the latest run's failure, if any.
    pub error: Option<String>,
    /// Highest run id issued so far; transitions from older runs are stale.
    pub latest_run: RunId,
}

/// State transitions.
#[derive(Debug)]
pub enum Event {
    /// Persisted state was loaded at startup.
    Restored {
        query: Option<String>,
        prefs: PreferenceSet,
    },
    /// The user edited the location.
    LocationChanged(String),
    /// The user flipped one forecast field.
    PreferenceToggled(ForecastField),
    /// A new run was issued and is resolving the location.
    RunStarted(RunId),
    /// A run finished resolution and started fetching.
    RunFetching { run: RunId, place: Place },
    /// A run finished, successfully or not.
    RunCompleted {
        run: RunId,
        outcome: Result<DailyForecast, AppError>,
    },
}

/// Pure reducer: the only place application state changes shape.
pub fn update(state: &AppState, event: Event) -> AppState {
    let mut next = state.clone();
    match event {
        Event::Restored { query, prefs } => {
            if let Some(query) = query {
                next.query = query;
            }
            next.prefs = prefs;
        }
        Event::LocationChanged(query) => {
            next.query = query;
        }
        Event::PreferenceToggled(field) => {
            next.prefs = next.prefs.toggle(field);
        }
        Event::RunStarted(run) => {
            // Run tasks are spawned in issue order but may start out of
            // order; a lower id arriving late must not regress the cursor.
            if run > next.latest_run {
                next.latest_run = run;
                next.phase = RunPhase::Resolving;
                next.error = None;
            }
        }
        Event::RunFetching { run, place } => {
            if run == next.latest_run {
                next.phase = RunPhase::Fetching;
                next.place = Some(place);
            }
        }
        Event::RunCompleted { run, outcome } => {
            if run == next.latest_run {
                match outcome {
                    Ok(forecast) => {
                        next.forecast = Some(forecast);
                        next.phase = RunPhase::Ready;
                        next.error = None;
                    }
                    Err(e) => {
                        next.phase = RunPhase::Failed;
                        next.error = Some(e.to_string());
                    }
                }
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_weather::{Coordinates, WeatherError};
    use std::collections::BTreeMap;

    fn place(name: &str, lat: f64) -> Place {
        Place {
            name: name.to_string(),
            country: None,
            coords: Coordinates::checked(lat, 0.0).unwrap(),
        }
    }

    fn forecast(tz: &str) -> DailyForecast {
        DailyForecast {
            timezone: tz.to_string(),
            timezone_abbreviation: None,
            units: BTreeMap::new(),
            days: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    #[test]
    fn test_run_lifecycle_reaches_ready() {
        let s0 = AppState::default();
        let s1 = update(&s0, Event::RunStarted(1));
        assert_eq!(s1.phase, RunPhase::Resolving);

        let s2 = update(
            &s1,
            Event::RunFetching {
                run: 1,
                place: place("Calgary", 51.05),
            },
        );
        assert_eq!(s2.phase, RunPhase::Fetching);

        let s3 = update(
            &s2,
            Event::RunCompleted {
                run: 1,
                outcome: Ok(forecast("America/Edmonton")),
            },
        );
        assert_eq!(s3.phase, RunPhase::Ready);
        assert!(s3.error.is_none());
        assert_eq!(s3.forecast.unwrap().timezone, "America/Edmonton");
    }

    #[test]
    fn test_failed_run_keeps_previous_forecast() {
        let mut state = AppState::default();
        state = update(&state, Event::RunStarted(1));
        state = update(
            &state,
            Event::RunCompleted {
                run: 1,
                outcome: Ok(forecast("Europe/Berlin")),
            },
        );

        state = update(&state, Event::RunStarted(2));
        state = update(
            &state,
            Event::RunCompleted {
                run: 2,
                outcome: Err(WeatherError::NotFound("Xyzzy".into()).into()),
            },
        );

        assert_eq!(state.phase, RunPhase::Failed);
        assert!(state.error.as_deref().unwrap().contains("Xyzzy"));
        // The stale-but-valid forecast stays visible behind the error.
        assert_eq!(state.forecast.unwrap().timezone, "Europe/Berlin");
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut state = AppState::default();
        state = update(&state, Event::RunStarted(1));
        state = update(&state, Event::RunStarted(2));

        // Run 2 (newer) completes first.
        state = update(
            &state,
            Event::RunCompleted {
                run: 2,
                outcome: Ok(forecast("Europe/Berlin")),
            },
        );
        assert_eq!(state.phase, RunPhase::Ready);

        // Run 1's late completion must not overwrite run 2's result.
        state = update(
            &state,
            Event::RunCompleted {
                run: 1,
                outcome: Ok(forecast("America/Edmonton")),
            },
        );
        assert_eq!(state.phase, RunPhase::Ready);
        assert_eq!(state.forecast.unwrap().timezone, "Europe/Berlin");
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut state = AppState::default();
        state = update(&state, Event::RunStarted(1));
        state = update(&state, Event::RunStarted(2));
        state = update(
            &state,
            Event::RunCompleted {
                run: 2,
                outcome: Ok(forecast("Europe/Berlin")),
            },
        );
        state = update(
            &state,
            Event::RunCompleted {
                run: 1,
                outcome: Err(WeatherError::EmptyQuery.into()),
            },
        );

        assert_eq!(state.phase, RunPhase::Ready);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_stale_fetching_transition_is_discarded() {
        let mut state = AppState::default();
        state = update(&state, Event::RunStarted(1));
        state = update(&state, Event::RunStarted(2));
        state = update(
            &state,
            Event::RunFetching {
                run: 2,
                place: place("Berlin", 52.52),
            },
        );

        // Run 1's resolution lands late and must not move the phase back.
        state = update(
            &state,
            Event::RunFetching {
                run: 1,
                place: place("Calgary", 51.05),
            },
        );
        assert_eq!(state.phase, RunPhase::Fetching);
        assert_eq!(state.place.unwrap().name, "Berlin");
    }

    #[test]
    fn test_late_run_started_does_not_regress_cursor() {
        let mut state = AppState::default();
        state = update(&state, Event::RunStarted(2));
        state = update(&state, Event::RunStarted(1));
        assert_eq!(state.latest_run, 2);

        // The newer run's transitions still apply.
        state = update(
            &state,
            Event::RunCompleted {
                run: 2,
                outcome: Ok(forecast("Europe/Berlin")),
            },
        );
        assert_eq!(state.phase, RunPhase::Ready);
    }

    #[test]
    fn test_restored_keeps_query_when_none_saved() {
        let state = update(
            &AppState::default(),
            Event::Restored {
                query: None,
                prefs: PreferenceSet::empty(),
            },
        );
        assert_eq!(state.query, "");
        assert!(state.prefs.is_empty());
    }

    #[test]
    fn test_preference_toggle_updates_prefs() {
        let state = update(
            &AppState::default(),
            Event::PreferenceToggled(ForecastField::RainSum),
        );
        assert!(!state.prefs.is_enabled(ForecastField::RainSum));
    }
}
