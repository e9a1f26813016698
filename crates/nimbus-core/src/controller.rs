//! Drives resolve-then-fetch pipeline runs against the application state.
//!
//! Each user action issues a run with a fresh sequence number; run tasks
//! apply their transitions through the reducer, which discards anything
//! from a run that is no longer the latest. Persistence happens off the
//! run path: location edits and preference toggles are written to the user
//! store as fire-and-forget blocking tasks whose failures are only logged.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use nimbus_store::UserStore;
use nimbus_weather::{ForecastClient, ForecastField, GeocodeClient, Place, PreferenceSet};

use crate::config::Config;
use crate::error::AppError;
use crate::state::{update, AppState, Event, RunId};

const STORE_FILE: &str = "user.db";

/// A spawned pipeline run: its sequence number and the task driving it.
///
/// The task is detached by default; tests await it for determinism.
#[derive(Debug)]
pub struct RunHandle {
    pub run: RunId,
    pub task: JoinHandle<()>,
}

enum RunKind {
    /// Resolve the query, then fetch.
    Full(String),
    /// Re-fetch against an already resolved place (preference toggles).
    FetchOnly(Place),
}

/// Owns the clients, the store, and the application state.
#[derive(Clone)]
pub struct Controller {
    state: Arc<Mutex<AppState>>,
    geocode: GeocodeClient,
    forecast: ForecastClient,
    store: Arc<UserStore>,
    runs: Arc<AtomicU64>,
}

impl Controller {
    pub fn new(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory {}", config.data_dir.display())
        })?;
        let store = UserStore::open(&config.data_dir.join(STORE_FILE))?;

        let timeout = Duration::from_secs(config.weather.request_timeout_secs);
        let geocode = GeocodeClient::with_base_url(&config.weather.geocoding_url, timeout)?;
        let forecast = ForecastClient::with_base_url(&config.weather.forecast_url, timeout)?;

        Ok(Self {
            state: Arc::new(Mutex::new(AppState::default())),
            geocode,
            forecast,
            store: Arc::new(store),
            runs: Arc::new(AtomicU64::new(0)),
        })
    }

    /// A snapshot of the current application state.
    pub fn state(&self) -> AppState {
        self.state.lock().clone()
    }

    fn apply(&self, event: Event) {
        let mut guard = self.state.lock();
        *guard = update(&guard, event);
    }

    fn next_run(&self) -> RunId {
        self.runs.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Reload persisted location and preferences, then replay the full
    /// pipeline once if a location was saved. Called once at process start.
    pub async fn startup(&self) {
        let query = self.store.load_location();
        let prefs = self.store.load_preferences();
        self.apply(Event::Restored {
            query: query.clone(),
            prefs,
        });

        if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
            tracing::info!("Replaying pipeline for saved location \"{}\"", query);
            let run = self.next_run();
            self.clone().execute_run(run, RunKind::Full(query)).await;
        }
    }

    /// The user entered a new location: persist it and start a full run.
    pub fn set_location(&self, query: &str) -> RunHandle {
        let query = query.trim().to_string();
        self.apply(Event::LocationChanged(query.clone()));
        self.persist_location(query.clone());
        self.spawn_run(RunKind::Full(query))
    }

    /// The user flipped one forecast field: persist the new set and
    /// re-fetch. Uses the last resolved place when there is one; falls back
    /// to a full run when a query exists but nothing resolved yet. Returns
    /// `None` when there is no location to fetch for.
    pub fn toggle(&self, field: ForecastField) -> Option<RunHandle> {
        self.apply(Event::PreferenceToggled(field));
        let snapshot = self.state();
        self.persist_preferences(snapshot.prefs.clone());

        if let Some(place) = snapshot.place {
            Some(self.spawn_run(RunKind::FetchOnly(place)))
        } else if !snapshot.query.trim().is_empty() {
            Some(self.spawn_run(RunKind::Full(snapshot.query)))
        } else {
            None
        }
    }

    fn spawn_run(&self, kind: RunKind) -> RunHandle {
        let run = self.next_run();
        let me = self.clone();
        let task = tokio::spawn(async move { me.execute_run(run, kind).await });
        RunHandle { run, task }
    }

    async fn execute_run(self, run: RunId, kind: RunKind) {
        self.apply(Event::RunStarted(run));

        let place = match kind {
            RunKind::Full(query) => match self.geocode.resolve(&query).await {
                Ok(place) => place,
                Err(e) => {
                    tracing::warn!("Run {} failed during resolution: {}", run, e);
                    self.apply(Event::RunCompleted {
                        run,
                        outcome: Err(e.into()),
                    });
                    return;
                }
            },
            RunKind::FetchOnly(place) => place,
        };

        self.apply(Event::RunFetching {
            run,
            place: place.clone(),
        });

        // Read the selection at fetch time so a toggle applied between
        // resolution and fetch is honored by this run.
        let prefs = self.state.lock().prefs.clone();
        let outcome = self
            .forecast
            .fetch(place.coords, &prefs)
            .await
            .map_err(|e| {
                tracing::warn!("Run {} failed during fetch: {}", run, e);
                AppError::from(e)
            });

        self.apply(Event::RunCompleted { run, outcome });
    }

    fn persist_location(&self, query: String) {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save_location(&query) {
                tracing::warn!("Failed to persist location: {}", e);
            }
        });
    }

    fn persist_preferences(&self, prefs: PreferenceSet) {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save_preferences(&prefs) {
                tracing::warn!("Failed to persist preferences: {}", e);
            }
        });
    }
}
