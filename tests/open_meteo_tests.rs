//! Integration tests for the Open-Meteo client using WireMock
//!
//! A mock server stands in for both the geocoding and the forecast API, so
//! the full request/response handling runs without network access.

use std::sync::Arc;

use citycast::render::CardDetail;
use citycast::{
    CityQuery, CitycastConfig, CitycastError, Coordinates, DayCount, FallbackPolicy,
    ForecastOrchestrator, OpenMeteoClient, SearchContext, SearchOutcome, WeatherApi,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config(server: &MockServer) -> CitycastConfig {
    let mut config = CitycastConfig::default();
    config.geocoding.base_url = format!("{}/v1", server.uri());
    config.forecast.base_url = format!("{}/v1", server.uri());
    config.forecast.timeout_seconds = 5;
    config
}

fn client(server: &MockServer) -> OpenMeteoClient {
    OpenMeteoClient::new(&test_config(server)).expect("Failed to create client")
}

fn chicago_search_response() -> Value {
    json!({
        "results": [
            {
                "id": 4887398,
                "name": "Chicago",
                "latitude": 40.0,
                "longitude": -82.0,
                "country": "United States",
                "admin1": "Ohio"
            },
            {
                "id": 4887399,
                "name": "Chicago",
                "latitude": 41.85,
                "longitude": -87.65,
                "elevation": 179.0,
                "country": "United States",
                "admin1": "Illinois",
                "admin2": "Cook"
            }
        ],
        "generationtime_ms": 0.5
    })
}

/// Seven days starting 2099-01-05 (a Monday), so every hour lies in the future
fn forecast_response() -> Value {
    let dates: Vec<String> = (5..12).map(|d| format!("2099-01-{d:02}")).collect();
    let hours: Vec<String> = (0..48)
        .map(|h| format!("2099-01-{:02}T{:02}:00", 5 + h / 24, h % 24))
        .collect();

    json!({
        "latitude": 41.85,
        "longitude": -87.65,
        "timezone": "America/Chicago",
        "utc_offset_seconds": -21600,
        "current_weather": {
            "temperature": 31.6,
            "windspeed": 11.2,
            "winddirection": 270.0,
            "weathercode": 71,
            "time": "2099-01-05T00:00"
        },
        "daily": {
            "time": dates,
            "weathercode": [71, 3, 0, 61, null, 95, 2],
            "temperature_2m_max": [33.4, 35.0, 40.5, 42.0, 38.0, 36.6, 30.1],
            "temperature_2m_min": [20.5, 22.0, 25.0, null, 27.0, 24.0, 18.0],
            "sunrise": dates.iter().map(|d| format!("{d}T07:18")).collect::<Vec<_>>(),
            "sunset": dates.iter().map(|d| format!("{d}T16:35")).collect::<Vec<_>>(),
            "windspeed_10m_max": [14.26, 10.0, 8.0, 12.0, 9.0, 20.0, 7.0],
            "relative_humidity_2m_max": [92, 85, 70, 88, 90, 95, 80]
        },
        "hourly": {
            "time": hours,
            "temperature_2m": (0..48).map(|h| 20.0 + f64::from(h) / 2.0).collect::<Vec<_>>(),
            "weathercode": (0..48).map(|h| if h < 24 { 71 } else { 3 }).collect::<Vec<_>>()
        }
    })
}

async fn mount_search(server: &MockServer, name: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// =============================================================================
// Geocoding Tests
// =============================================================================

#[tokio::test]
async fn test_search_sends_expected_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Chicago"))
        .and(query_param("count", "10"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chicago_search_response()))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = client(&server).search("Chicago", 10).await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[1].admin1.as_deref(), Some("Illinois"));
    assert_eq!(candidates[1].admin2.as_deref(), Some("Cook"));
}

#[tokio::test]
async fn test_search_without_results_field_is_empty() {
    let server = MockServer::start().await;
    mount_search(&server, "Atlantis", json!({ "generationtime_ms": 0.2 })).await;

    let candidates = client(&server).search("Atlantis", 10).await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn test_rate_limit_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client(&server).search("Chicago", 10).await.unwrap_err();
    match err {
        CitycastError::Api { message } => assert!(message.contains("429")),
        other => panic!("expected Api error, got {other:?}"),
    }
}

// =============================================================================
// Forecast Tests
// =============================================================================

#[tokio::test]
async fn test_forecast_decodes_nulls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "41.85"))
        .and(query_param("longitude", "-87.65"))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .expect(1)
        .mount(&server)
        .await;

    let data = client(&server)
        .forecast(Coordinates::new(41.85, -87.65).unwrap())
        .await
        .unwrap();

    assert_eq!(data.daily.len(), 7);
    assert_eq!(data.hourly.len(), 48);
    assert_eq!(data.utc_offset_seconds, -21600);
    assert_eq!(data.daily.weathercode[4], None);
    assert_eq!(data.daily.temperature_2m_min[3], None);
}

#[tokio::test]
async fn test_misaligned_daily_arrays_are_rejected() {
    let server = MockServer::start().await;
    let mut body = forecast_response();
    body["daily"]["sunset"] = json!(["2099-01-05T16:35"]);
    mount_forecast(&server, body).await;

    let err = client(&server)
        .forecast(Coordinates::new(41.85, -87.65).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, CitycastError::Parse { .. }));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .forecast(Coordinates::new(0.0, 0.0).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, CitycastError::Parse { .. }));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server)
        .forecast(Coordinates::new(0.0, 0.0).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, CitycastError::Api { .. }));
}

#[tokio::test]
async fn test_transient_failure_is_retried_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_forecast(&server, forecast_response()).await;

    let mut config = test_config(&server);
    config.forecast.max_retries = 2;
    let client = OpenMeteoClient::new(&config).unwrap();

    let data = client
        .forecast(Coordinates::new(41.85, -87.65).unwrap())
        .await
        .unwrap();
    assert_eq!(data.daily.len(), 7);
}

// =============================================================================
// End-to-end Search Tests
// =============================================================================

fn orchestrator(config: &CitycastConfig) -> ForecastOrchestrator {
    let client = OpenMeteoClient::new(config).unwrap();
    ForecastOrchestrator::new(Arc::new(client), config)
}

#[tokio::test]
async fn test_state_hint_picks_matching_city() {
    let server = MockServer::start().await;
    mount_search(&server, "Chicago", chicago_search_response()).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "41.85"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&test_config(&server));
    let ctx = SearchContext::new(CityQuery::parse("Chicago, Illinois").unwrap(), DayCount::One);
    let SearchOutcome::Rendered(view) = orchestrator.show_forecast(ctx).await.unwrap() else {
        panic!("expected a rendered view");
    };

    assert_eq!(view.city, "Chicago, Illinois");
    let card = view.cards().next().unwrap();
    assert_eq!(card.day_name, "Mon");
    assert_eq!(card.description, "Light snow");
    assert_eq!(card.high, Some(33));
    match &card.detail {
        CardDetail::Full {
            sunrise, hourly, ..
        } => {
            assert_eq!(sunrise.as_deref(), Some("7:18 AM"));
            assert_eq!(hourly.len(), 12);
            assert_eq!(hourly[0].label, "12 AM");
        }
        other => panic!("expected full detail, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_state_uses_top_result() {
    let server = MockServer::start().await;
    mount_search(&server, "Chicago", chicago_search_response()).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&test_config(&server));
    let ctx = SearchContext::new(CityQuery::parse("Chicago").unwrap(), DayCount::Seven);
    let SearchOutcome::Rendered(view) = orchestrator.show_forecast(ctx).await.unwrap() else {
        panic!("expected a rendered view");
    };

    assert_eq!(view.city, "Chicago, Ohio");
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].len(), 3);
    assert_eq!(view.rows[1].len(), 4);
}

#[tokio::test]
async fn test_unknown_city_never_fetches_forecast() {
    let server = MockServer::start().await;
    mount_search(&server, "Atlantis", json!({})).await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(&test_config(&server));
    let ctx = SearchContext::new(CityQuery::parse("Atlantis").unwrap(), DayCount::Three);
    let err = orchestrator.show_forecast(ctx).await.unwrap_err();

    assert!(matches!(err, CitycastError::CityNotFound { .. }));
    assert_eq!(err.user_message(), "City not found. Please try again.");
}

#[tokio::test]
async fn test_strict_policy_rejects_unmatched_state() {
    let server = MockServer::start().await;
    mount_search(&server, "Chicago", chicago_search_response()).await;

    let mut config = test_config(&server);
    config.geocoding.fallback = FallbackPolicy::Strict;
    let orchestrator = orchestrator(&config);
    let ctx = SearchContext::new(CityQuery::parse("Chicago, Texas").unwrap(), DayCount::Three);

    let err = orchestrator.show_forecast(ctx).await.unwrap_err();
    assert!(matches!(
        err,
        CitycastError::AmbiguousCity { candidates: 2, .. }
    ));
}

#[tokio::test]
async fn test_selected_suggestion_skips_geocoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chicago_search_response()))
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server, forecast_response()).await;

    let orchestrator = orchestrator(&test_config(&server));
    let suggestions = orchestrator.suggest("Chicago, il").await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].label, "Chicago, Illinois, United States");

    orchestrator.select(suggestions[0].clone());
    let ctx = SearchContext::new(CityQuery::parse("Chicago").unwrap(), DayCount::Three);
    let outcome = orchestrator.show_forecast(ctx).await.unwrap();

    let SearchOutcome::Rendered(view) = outcome else {
        panic!("expected a rendered view");
    };
    assert_eq!(view.city, "Chicago, Illinois");
    assert!(matches!(
        view.cards().next().unwrap().detail,
        CardDetail::Conditions { .. }
    ));
}
