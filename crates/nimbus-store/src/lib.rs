//! Durable string-keyed storage for the saved location and preference set.
//!
//! A single SQLite table acts as the key/value store. Reads never fail the
//! caller: corrupt or missing data falls back to documented defaults with a
//! logged warning, so the user only ever sees a reset, not an error.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

use nimbus_weather::PreferenceSet;

const LOCATION_KEY: &str = "user_location";
const PREFERENCES_KEY: &str = "user_preferences";

/// Storage errors. Only surfaced for opening the store and for writes;
/// reads are absorbed to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open user store: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Open(_) => "Unable to access saved data. Try restarting the app.",
            StoreError::Query(_) => "A data operation failed. Please try again.",
            StoreError::Serialize(_) => "Failed to save your settings. Please try again.",
        }
    }
}

/// Local SQLite storage for user state.
#[derive(Debug)]
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "CREATE TABLE IF NOT EXISTS user_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM user_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO user_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Durably save the user's location query, overwriting any previous one.
    pub fn save_location(&self, location: &str) -> Result<(), StoreError> {
        self.set(LOCATION_KEY, location)
    }

    /// The last saved location query, or `None` if nothing was saved.
    /// Read errors are logged and treated as absent data.
    pub fn load_location(&self) -> Option<String> {
        match self.get(LOCATION_KEY) {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Failed to load saved location: {}", e);
                None
            }
        }
    }

    /// Durably save the preference set, overwriting any previous one.
    pub fn save_preferences(&self, prefs: &PreferenceSet) -> Result<(), StoreError> {
        let json = serde_json::to_string(prefs)?;
        self.set(PREFERENCES_KEY, &json)
    }

    /// The last saved preference set, or the default (all fields enabled)
    /// if nothing was saved or the stored value is malformed. Never fails.
    pub fn load_preferences(&self) -> PreferenceSet {
        let stored = match self.get(PREFERENCES_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return PreferenceSet::default(),
            Err(e) => {
                tracing::warn!("Failed to load preferences, using defaults: {}", e);
                return PreferenceSet::default();
            }
        };

        match serde_json::from_str(&stored) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Stored preferences are malformed, using defaults: {}", e);
                PreferenceSet::default()
            }
        }
    }
}
