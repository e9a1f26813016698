pub mod config;
pub mod controller;
pub mod error;
pub mod state;

pub use config::{Config, ValidationResult, WeatherConfig};
pub use controller::{Controller, RunHandle};
pub use error::{AppError, ConfigError};
pub use state::{update, AppState, Event, RunId, RunPhase};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Nimbus core initialized");
    Ok(())
}
