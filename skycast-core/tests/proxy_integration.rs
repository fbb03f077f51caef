//! Integration tests for the proxy endpoint.
//!
//! A wiremock server stands in for OpenWeather; the proxy runs on a real socket and is
//! exercised over HTTP both directly and through `ProxyClient`.

use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skycast_core::provider::Reply;
use skycast_core::{
    Location, OpenWeatherClient, ProxyClient, ProxyService, UpstreamProvider, WeatherSource,
    server,
};

fn seoul_matches() -> Value {
    json!([
        {
            "name": "Seoul",
            "local_names": { "en": "Seoul", "ko": "서울" },
            "lat": 37.5666791,
            "lon": 126.9782914,
            "country": "KR"
        },
        {
            "name": "Seoul",
            "lat": 40.2,
            "lon": -86.1,
            "country": "US",
            "state": "Indiana"
        }
    ])
}

fn current_body() -> Value {
    json!({
        "coord": { "lon": -3.7038, "lat": 40.4168 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": { "temp": 21.3, "feels_like": 20.8, "temp_min": 19.9, "temp_max": 22.4, "pressure": 1018, "humidity": 41 },
        "wind": { "speed": 2.57, "deg": 240 },
        "clouds": { "all": 0 },
        "dt": 1_709_550_000,
        "name": "Madrid",
        "cod": 200
    })
}

fn forecast_body() -> Value {
    let list: Vec<Value> = (0..40)
        .map(|i| {
            json!({
                "dt": 1_709_553_600 + i * 10_800,
                "main": { "temp": 15.0 + (i % 8) as f64, "feels_like": 14.0 },
                "weather": [{ "id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d" }],
                "pop": 0.1,
                "dt_txt": "2024-03-04 12:00:00"
            })
        })
        .collect();

    json!({ "cod": "200", "cnt": 40, "list": list, "city": { "name": "Madrid", "country": "ES" } })
}

async fn mount_weather(upstream: &MockServer, current_status: u16, forecast_status: u16) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(current_status).set_body_json(current_body()))
        .expect(1)
        .mount(upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(forecast_status).set_body_json(forecast_body()))
        .expect(1)
        .mount(upstream)
        .await;
}

async fn mount_geocode(upstream: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Seoul"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(seoul_matches()))
        .expect(expected_calls)
        .mount(upstream)
        .await;
}

fn upstream_client(upstream: &MockServer, api_key: Option<&str>) -> OpenWeatherClient {
    OpenWeatherClient::new(api_key.map(str::to_string)).with_base_url(upstream.uri())
}

/// Start the proxy on an ephemeral port and return its base URL.
async fn start_proxy(upstream: OpenWeatherClient) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = Arc::new(ProxyService::new(Arc::new(upstream)));

    tokio::spawn(server::serve(listener, service));
    format!("http://{addr}")
}

async fn get(base: &str, query: &[(&str, &str)]) -> (u16, Value) {
    let res = reqwest::Client::new()
        .get(format!("{base}/api/weather"))
        .query(query)
        .send()
        .await
        .unwrap();

    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_openweather_client_geocode() {
    let upstream = MockServer::start().await;
    mount_geocode(&upstream, 1).await;

    let client = upstream_client(&upstream, Some("TEST_KEY"));
    let reply = client.geocode("Seoul", 5).await.unwrap();

    let matches = reply.into_data().expect("2xx reply");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[1].state.as_deref(), Some("Indiana"));
}

#[tokio::test]
async fn test_openweather_client_reports_rejections() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&upstream)
        .await;

    let client = upstream_client(&upstream, Some("BAD_KEY"));
    let reply = client.current(Location::MADRID).await.unwrap();

    match reply {
        Reply::Failure { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        Reply::Success { .. } => panic!("expected a rejected reply"),
    }
}

#[tokio::test]
async fn test_openweather_client_decode_error() {
    let upstream = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&upstream)
        .await;

    let client = upstream_client(&upstream, Some("TEST_KEY"));
    let err = client.forecast(Location::MADRID).await.unwrap_err();

    assert!(err.to_string().contains("Failed to parse"), "{err}");
}

#[tokio::test]
async fn test_search_returns_geocode_shape_only() {
    let upstream = MockServer::start().await;
    mount_geocode(&upstream, 1).await;

    // The weather endpoint must never be hit for a search.
    Mock::given(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;
    let (status, body) = get(&base, &[("q", "Seoul")]).await;

    assert_eq!(status, 200);
    assert_eq!(body, seoul_matches());
}

#[tokio::test]
async fn test_weather_merges_current_and_forecast_list() {
    let upstream = MockServer::start().await;
    mount_weather(&upstream, 200, 200).await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;
    let (status, body) = get(&base, &[("lat", "40.4168"), ("lon", "-3.7038")]).await;

    assert_eq!(status, 200);
    assert_eq!(body["current"]["name"], "Madrid");
    assert_eq!(body["current"]["main"]["pressure"], 1018);
    assert_eq!(body["forecast"].as_array().map(Vec::len), Some(40));
    assert_eq!(body["forecast"][0]["dt_txt"], "2024-03-04 12:00:00");
    assert!(body.get("city").is_none());
}

#[tokio::test]
async fn test_weather_fails_when_either_call_fails() {
    let upstream = MockServer::start().await;
    mount_weather(&upstream, 200, 502).await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;
    let (status, body) = get(&base, &[("lat", "40.4168"), ("lon", "-3.7038")]).await;

    assert_eq!(status, 500);
    assert_eq!(
        body["error"],
        "Failed to fetch data: External Weather API failed with status 200 or 502"
    );
}

#[tokio::test]
async fn test_geocode_failure_is_500() {
    let upstream = MockServer::start().await;

    Mock::given(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;
    let (status, body) = get(&base, &[("q", "Seoul")]).await;

    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to fetch data: External Geo API failed with status 429");
}

#[tokio::test]
async fn test_missing_parameters_is_400_without_upstream_calls() {
    let upstream = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;

    let (status, body) = get(&base, &[]).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing required query parameters (q or lat/lon).");

    let (status, _) = get(&base, &[("lon", "-3.7")]).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_repeated_q_uses_the_first_value() {
    let upstream = MockServer::start().await;
    mount_geocode(&upstream, 1).await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;
    let res = reqwest::Client::new()
        .get(format!("{base}/api/weather?q=Seoul&q=Busan"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, seoul_matches());
}

#[tokio::test]
async fn test_every_rejection_has_a_json_error_body() {
    let upstream = MockServer::start().await;
    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;

    for query in ["lat=1&lat=2", "lat=north&lon=-3.7", "lon=1&lon=2&q="] {
        let res = reqwest::Client::new()
            .get(format!("{base}/api/weather?{query}"))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400, "{query}");
        let content_type = res.headers()[reqwest::header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/json"), "{query}: {content_type}");
        let body: Value = res.json().await.unwrap();
        assert!(body["error"].is_string(), "{query}");
    }
}

#[tokio::test]
async fn test_missing_api_key_is_500_for_every_request_shape() {
    let upstream = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let base = start_proxy(upstream_client(&upstream, None)).await;

    for query in [
        vec![("q", "Seoul")],
        vec![("lat", "40.4168"), ("lon", "-3.7038")],
        vec![],
    ] {
        let (status, body) = get(&base, &query).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "API key not configured. Please set WEATHER_API_KEY.");
    }
}

#[tokio::test]
async fn test_proxy_client_end_to_end() {
    let upstream = MockServer::start().await;
    mount_geocode(&upstream, 1).await;
    mount_weather(&upstream, 200, 200).await;

    let base = start_proxy(upstream_client(&upstream, Some("TEST_KEY"))).await;
    let client = ProxyClient::new(&base);

    let matches = client.search("Seoul").await.unwrap();
    assert_eq!(matches[0].name, "Seoul");
    assert_eq!(matches[0].region_line(), "KR");

    let bundle = client.weather(Location::from(&matches[0])).await.unwrap();
    assert_eq!(bundle.current.name, "Madrid");
    assert_eq!(bundle.current.condition_code(), 800);
    assert_eq!(bundle.forecast.len(), 40);
    assert_eq!(bundle.forecast[0].pop, Some(0.1));
}

#[tokio::test]
async fn test_proxy_client_surfaces_error_message() {
    let upstream = MockServer::start().await;
    let base = start_proxy(upstream_client(&upstream, None)).await;

    let err = ProxyClient::new(&base).weather(Location::MADRID).await.unwrap_err();
    let msg = err.to_string();

    assert!(msg.contains("500"), "{msg}");
    assert!(msg.contains("API key not configured"), "{msg}");
}
