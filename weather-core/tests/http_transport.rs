//! HTTP transport against a mock server, feeding the parsers.

use std::time::Duration;

use weather_core::{HttpTransport, ProviderId, Transport, TransportError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn transport() -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5)).expect("client should build")
}

#[tokio::test]
async fn fetches_and_parses_current_weather() {
    let server = MockServer::start().await;
    let body = r#"{"main":{"temp":292.15,"pressure":1014,"humidity":68},"wind":{"speed":4.6,"deg":20},"clouds":{"all":0},"dt":1530307200}"#;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("id", "2950159"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/data/2.5/weather?id=2950159&appid=KEY", server.uri());
    let fetched = transport().get(&url).await.unwrap();
    assert_eq!(fetched, body);

    let weather = ProviderId::OpenWeatherMap
        .parse_current_weather(&fetched)
        .unwrap();
    assert_eq!(weather.temperature_celsius, Some(19.0));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"API key not valid"}"#))
        .mount(&server)
        .await;

    let err = transport()
        .get(&format!("{}/current", server.uri()))
        .await
        .unwrap_err();

    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    let err = transport()
        .get("http://127.0.0.1:9/unreachable")
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Request(_)));
}
