use anyhow::Result;

use nimbus_core::{Config, Controller, RunPhase};
use nimbus_weather::ForecastField;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    nimbus_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let controller = Controller::new(&config)?;

    tracing::info!("Nimbus application started");

    // Reload persisted location and preferences, replaying the pipeline
    // once if a location was saved in a previous session.
    controller.startup().await;

    let state = controller.state();
    match state.phase {
        RunPhase::Idle => {
            println!("Nimbus - Daily Weather Lookup");
            println!("No saved location yet. Enter one in the app to get started.");
        }
        RunPhase::Ready => {
            if let Some(place) = &state.place {
                match &place.country {
                    Some(country) => println!("Forecast for {}, {}", place.name, country),
                    None => println!("Forecast for {}", place.name),
                }
            }
            if let Some(forecast) = &state.forecast {
                if let Some(day) = forecast.days.first() {
                    println!("Date: {} ({})", day, forecast.timezone);
                }
                for field in ForecastField::ALL {
                    if let Some(values) = forecast.field(field) {
                        let unit = forecast.unit(field).unwrap_or("");
                        for value in values {
                            println!("  {}: {} {}", field.label(), value, unit);
                        }
                    }
                }
            }
        }
        RunPhase::Failed => {
            let message = state.error.as_deref().unwrap_or("unknown error");
            eprintln!("Could not load weather for \"{}\": {}", state.query, message);
        }
        // startup() runs the pipeline to completion before returning.
        RunPhase::Resolving | RunPhase::Fetching => {}
    }

    Ok(())
}
