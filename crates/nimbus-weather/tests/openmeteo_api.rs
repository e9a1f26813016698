//! Integration tests for the geocoding and forecast clients using wiremock.
//!
//! These verify the request shapes sent to the Open-Meteo APIs and the
//! error taxonomy for the failure paths, without touching the network.

use std::time::Duration;

use nimbus_weather::{
    Coordinates, ForecastClient, ForecastField, GeocodeClient, PreferenceSet, WeatherError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(2);

fn geocode_client(server: &MockServer) -> GeocodeClient {
    GeocodeClient::with_base_url(&server.uri(), TIMEOUT).unwrap()
}

fn forecast_client(server: &MockServer) -> ForecastClient {
    ForecastClient::with_base_url(&server.uri(), TIMEOUT).unwrap()
}

fn calgary_response() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "name": "Calgary",
            "latitude": 51.0447,
            "longitude": -114.0719,
            "country": "Canada"
        }]
    })
}

#[tokio::test]
async fn test_resolve_returns_best_match_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Calgary"))
        .and(query_param("count", "1"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(calgary_response()))
        .expect(1)
        .mount(&server)
        .await;

    // Leading/trailing whitespace is trimmed before the request.
    let place = geocode_client(&server).resolve("  Calgary  ").await.unwrap();

    assert_eq!(place.name, "Calgary");
    assert_eq!(place.country.as_deref(), Some("Canada"));
    assert!((place.coords.latitude - 51.05).abs() < 0.1);
    assert!((place.coords.longitude - -114.07).abs() < 0.1);
    assert!((-90.0..=90.0).contains(&place.coords.latitude));
    assert!((-180.0..=180.0).contains(&place.coords.longitude));
}

#[tokio::test]
async fn test_resolve_empty_query_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = geocode_client(&server);
    assert!(matches!(
        client.resolve("").await,
        Err(WeatherError::EmptyQuery)
    ));
    assert!(matches!(
        client.resolve("   ").await,
        Err(WeatherError::EmptyQuery)
    ));

    server.verify().await;
}

#[tokio::test]
async fn test_resolve_no_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": []
        })))
        .mount(&server)
        .await;

    let err = geocode_client(&server).resolve("Nowheresville").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound(q) if q == "Nowheresville"));
}

#[tokio::test]
async fn test_resolve_missing_results_key_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let err = geocode_client(&server).resolve("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::NotFound(_)));
}

#[tokio::test]
async fn test_resolve_server_error_is_resolution_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = geocode_client(&server).resolve("Calgary").await.unwrap_err();
    assert!(matches!(err, WeatherError::ResolutionFailed(_)));
}

#[tokio::test]
async fn test_resolve_malformed_body_is_resolution_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = geocode_client(&server).resolve("Calgary").await.unwrap_err();
    assert!(matches!(err, WeatherError::ResolutionFailed(_)));
}

#[tokio::test]
async fn test_resolve_rejects_out_of_range_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": "Broken", "latitude": 123.0, "longitude": 0.0}]
        })))
        .mount(&server)
        .await;

    let err = geocode_client(&server).resolve("Broken").await.unwrap_err();
    assert!(matches!(err, WeatherError::ResolutionFailed(_)));
}

#[tokio::test]
async fn test_fetch_empty_selection_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let coords = Coordinates::checked(51.05, -114.07).unwrap();
    let err = forecast_client(&server)
        .fetch(coords, &PreferenceSet::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::NoFieldsSelected));

    server.verify().await;
}

#[tokio::test]
async fn test_fetch_requests_fields_in_canonical_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.05"))
        .and(query_param("longitude", "-114.07"))
        .and(query_param("daily", "weather_code,temperature_2m_max"))
        .and(query_param("forecast_days", "1"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timezone": "America/Edmonton",
            "timezone_abbreviation": "MST",
            "daily_units": {
                "time": "iso8601",
                "weather_code": "wmo code",
                "temperature_2m_max": "°C"
            },
            "daily": {
                "time": ["2026-08-27"],
                "weather_code": [3],
                "temperature_2m_max": [21.4]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Toggle order is the reverse of canonical order; the request must not care.
    let prefs = PreferenceSet::empty()
        .toggle(ForecastField::Temperature2mMax)
        .toggle(ForecastField::WeatherCode);

    let coords = Coordinates::checked(51.05, -114.07).unwrap();
    let forecast = forecast_client(&server).fetch(coords, &prefs).await.unwrap();

    assert_eq!(forecast.timezone, "America/Edmonton");
    assert_eq!(forecast.days.len(), 1);
    assert_eq!(
        forecast.field(ForecastField::WeatherCode),
        Some(&[serde_json::json!(3)][..])
    );
    assert_eq!(
        forecast.field(ForecastField::Temperature2mMax),
        Some(&[serde_json::json!(21.4)][..])
    );
    assert_eq!(forecast.unit(ForecastField::Temperature2mMax), Some("°C"));
    assert_eq!(forecast.field(ForecastField::RainSum), None);
}

#[tokio::test]
async fn test_fetch_server_error_is_fetch_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let coords = Coordinates::checked(51.05, -114.07).unwrap();
    let err = forecast_client(&server)
        .fetch(coords, &PreferenceSet::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn test_fetch_malformed_body_is_fetch_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let coords = Coordinates::checked(51.05, -114.07).unwrap();
    let err = forecast_client(&server)
        .fetch(coords, &PreferenceSet::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}
