use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wxlook_client::{FetchError, WeatherClient, WeatherService};
use wxlook_core::{Language, RecordSink, Units, WeatherRecord};

const KEY32: &str = "0123456789abcdef0123456789abcdef";

fn full_body() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -3.7026, "lat": 40.4165},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 21.4, "feels_like": 20.9, "pressure": 1017, "humidity": 52},
        "visibility": 10000,
        "wind": {"speed": 3.6, "deg": 220},
        "dt": 1690000123i64,
        "sys": {"country": "ES"},
        "name": "Madrid"
    })
}

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::new(Some(KEY32.to_string()), Units::Metric, Language::En)
        .with_base_url(server.uri())
}

#[tokio::test]
async fn successful_lookup_maps_all_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "Madrid"))
        .and(query_param("appid", KEY32))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_body()))
        .expect(1)
        .mount(&server)
        .await;

    let record = client_for(&server).fetch("Madrid", 7).await.unwrap();

    assert_eq!(record.city, "Madrid");
    assert_eq!(record.country.as_deref(), Some("ES"));
    assert_eq!(record.latitude, Some(40.4165));
    assert_eq!(record.longitude, Some(-3.7026));
    assert_eq!(record.temperature, Some(21.4));
    assert_eq!(record.feels_like, Some(20.9));
    assert_eq!(record.humidity, Some(52.0));
    assert_eq!(record.pressure, Some(1017.0));
    assert_eq!(record.wind_speed, Some(3.6));
    assert_eq!(record.wind_direction, Some(220.0));
    assert_eq!(record.condition, "clear sky");
    assert_eq!(record.condition_code, Some(800));
    assert_eq!(record.icon.as_deref(), Some("01d"));
    assert_eq!(record.visibility, Some(10000));
    assert_eq!(record.observation_time, 1_690_000_123);
    assert!(record.recorded_at > 0);
    assert_eq!(record.requesting_user_id, 7);
}

#[tokio::test]
async fn imperial_and_spanish_parameters_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("units", "imperial"))
        .and(query_param("lang", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = WeatherClient::new(Some(KEY32.to_string()), Units::Imperial, Language::Es)
        .with_base_url(server.uri());
    client.fetch("Madrid", 0).await.unwrap();
}

#[tokio::test]
async fn response_without_name_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 21.4},
            "weather": [{"id": 800, "description": "clear sky", "icon": "01d"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn empty_name_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": ""})))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn error_status_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).fetch("Nowhere", 0).await.unwrap_err();
    match err {
        FetchError::Transport(msg) => assert!(msg.contains("404"), "got: {msg}"),
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_upstream_is_transport() {
    // Nothing listens here.
    let client = WeatherClient::new(Some(KEY32.to_string()), Units::Metric, Language::En)
        .with_base_url("http://127.0.0.1:1");
    let err = client.fetch("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

// Both ends of the key chain touch the same process environment, so they run
// in one test body.
#[tokio::test]
async fn key_chain_controls_whether_a_request_is_made() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_body()))
        .mount(&server)
        .await;

    std::env::remove_var(wxlook_config::API_KEY_ENV);
    let keyless = WeatherClient::new(None, Units::Metric, Language::En)
        .with_base_url(server.uri());

    let err = keyless.fetch("Madrid", 0).await.unwrap_err();
    assert!(matches!(err, FetchError::Unauthenticated));
    assert_eq!(
        server.received_requests().await.unwrap_or_default().len(),
        0,
        "unauthenticated lookup must not touch the network"
    );

    std::env::set_var(wxlook_config::API_KEY_ENV, KEY32);
    let record = keyless.fetch("Madrid", 0).await.unwrap();
    assert_eq!(record.city, "Madrid");
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
    std::env::remove_var(wxlook_config::API_KEY_ENV);
}

struct FailingSink;

#[async_trait::async_trait]
impl RecordSink for FailingSink {
    async fn append(&mut self, _record: &WeatherRecord) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("disk full"))
    }
}

struct VecSink(std::sync::Arc<std::sync::Mutex<Vec<WeatherRecord>>>);

#[async_trait::async_trait]
impl RecordSink for VecSink {
    async fn append(&mut self, record: &WeatherRecord) -> anyhow::Result<()> {
        self.0.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[tokio::test]
async fn failed_append_still_returns_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_body()))
        .mount(&server)
        .await;

    let service = WeatherService::new(client_for(&server), Box::new(FailingSink));
    let record = service.lookup("Madrid", 0).await.unwrap();
    assert_eq!(record.city, "Madrid");
}

#[tokio::test]
async fn successful_lookup_lands_in_the_sink() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_body()))
        .mount(&server)
        .await;

    let appended = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let service = WeatherService::new(client_for(&server), Box::new(VecSink(appended.clone())));

    service.lookup("Madrid", 3).await.unwrap();

    let rows = appended.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "Madrid");
    assert_eq!(rows[0].requesting_user_id, 3);
}

#[tokio::test]
async fn fetch_failure_reaches_no_sink() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let appended = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let service = WeatherService::new(client_for(&server), Box::new(VecSink(appended.clone())));

    assert!(service.lookup("Madrid", 0).await.is_err());
    assert!(appended.lock().unwrap().is_empty());
}
