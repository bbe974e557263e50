//! Integration tests for the Open-Meteo client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skycast_core::provider::open_meteo::OpenMeteo;
use skycast_core::{
    CurrentWeatherProvider, FetchError, FetchOrchestrator, FetchState, GeocodeProvider,
    ProviderError, wmo,
};

fn client(server: &MockServer) -> OpenMeteo {
    OpenMeteo::with_endpoints(
        format!("{}/v1/search", server.uri()),
        format!("{}/v1/forecast", server.uri()),
    )
}

fn london_geo_body() -> serde_json::Value {
    json!({
        "results": [{
            "latitude": 51.5,
            "longitude": -0.12,
            "name": "London",
            "country": "United Kingdom"
        }]
    })
}

fn london_weather_body() -> serde_json::Value {
    json!({
        "current": {
            "time": "2026-08-30T14:00",
            "temperature_2m": 15.4,
            "apparent_temperature": 14.0,
            "relative_humidity_2m": 70,
            "wind_speed_10m": 12.3,
            "weather_code": 3
        }
    })
}

#[tokio::test]
async fn geocode_sends_expected_query_and_decodes_first_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "London"))
        .and(query_param("count", "1"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geo_body()))
        .expect(1)
        .mount(&server)
        .await;

    let place = client(&server)
        .resolve("London")
        .await
        .unwrap()
        .expect("London should resolve");

    assert_eq!(place.latitude, 51.5);
    assert_eq!(place.longitude, -0.12);
    assert_eq!(place.name, "London");
    assert_eq!(place.country, "United Kingdom");
}

#[tokio::test]
async fn geocode_without_results_key_resolves_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.3})))
        .mount(&server)
        .await;

    let resolved = client(&server).resolve("Nonexistentville").await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn geocode_defaults_missing_country_to_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"latitude": 0.0, "longitude": 0.0, "name": "Null Island"}]
        })))
        .mount(&server)
        .await;

    let place = client(&server).resolve("Null Island").await.unwrap().unwrap();
    assert_eq!(place.country, "");
}

#[tokio::test]
async fn geocode_server_error_is_a_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).resolve("London").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn geocode_with_empty_results_array_resolves_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let resolved = client(&server).resolve("Nonexistentville").await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn geocode_server_error_with_multibyte_body_is_a_transport_failure() {
    let server = MockServer::start().await;

    // Body longer than the truncation cap, made of multibyte chars so the
    // cap lands mid-character. Must yield an error, not a panic.
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("€".repeat(100)))
        .mount(&server)
        .await;

    let err = client(&server).resolve("London").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn weather_sends_expected_query_and_decodes_conditions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.5"))
        .and(query_param("longitude", "-0.12"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m",
        ))
        .and(query_param("temperature_unit", "celsius"))
        .and(query_param("wind_speed_unit", "kmh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_weather_body()))
        .expect(1)
        .mount(&server)
        .await;

    let conditions = client(&server).current(51.5, -0.12).await.unwrap();
    assert_eq!(conditions.temperature_c, 15.4);
    assert_eq!(conditions.feels_like_c, 14.0);
    assert_eq!(conditions.humidity_pct, 70.0);
    assert_eq!(conditions.wind_kmh, 12.3);
    assert_eq!(conditions.code, 3);
    assert!(conditions.observed_at.is_some());
}

#[tokio::test]
async fn weather_with_malformed_payload_is_a_decode_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {"time": "x"}})))
        .mount(&server)
        .await;

    let err = client(&server).current(51.5, -0.12).await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)), "got {err:?}");
}

async fn terminal_state(orch: &FetchOrchestrator, city: &str) -> FetchState {
    let mut rx = orch.subscribe();
    orch.submit(city);
    loop {
        let state = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("timed out waiting for a state transition")
            .expect("state stream closed");
        if state.is_terminal() {
            return state;
        }
    }
}

#[tokio::test]
async fn end_to_end_london_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geo_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_weather_body()))
        .mount(&server)
        .await;

    let provider = Arc::new(client(&server));
    let orch = FetchOrchestrator::new(provider.clone(), provider);

    match terminal_state(&orch, "London").await {
        FetchState::Succeeded(reading) => {
            assert_eq!(reading.location, "London, United Kingdom");
            assert_eq!(reading.temperature_c, 15.4);
            assert_eq!(reading.feels_like_c, 14.0);
            assert_eq!(reading.humidity_pct, 70.0);
            assert_eq!(reading.wind_kmh, 12.3);
            assert_eq!(reading.code, 3);
            assert_eq!(wmo::lookup(reading.code).description, "Overcast");
        }
        other => panic!("expected a reading, got {other:?}"),
    }
}

#[tokio::test]
async fn end_to_end_unknown_city_reports_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let provider = Arc::new(client(&server));
    let orch = FetchOrchestrator::new(provider.clone(), provider);

    assert_eq!(
        terminal_state(&orch, "Nonexistentville").await,
        FetchState::Failed(FetchError::NotFound { city: "Nonexistentville".into() }),
    );
}

#[tokio::test]
async fn end_to_end_slow_provider_reports_network_failure() {
    let server = MockServer::start().await;

    // Longer than the 5s per-call budget.
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(london_geo_body())
                .set_delay(Duration::from_secs(8)),
        )
        .mount(&server)
        .await;

    let provider = Arc::new(client(&server));
    let orch = FetchOrchestrator::new(provider.clone(), provider);

    assert_eq!(
        terminal_state(&orch, "London").await,
        FetchState::Failed(FetchError::Network),
    );
}
