use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::model::{CityMatch, CurrentConditions, ForecastSeries, Location};

use super::{Reply, UpstreamError, UpstreamProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the client at another host, e.g. a mock server in tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key.as_deref().ok_or(UpstreamError::MissingCredentials)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Reply<T>, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| UpstreamError::Transport { endpoint, source })?;

        if !status.is_success() {
            tracing::warn!(%endpoint, status = status.as_u16(), "OpenWeather request was rejected");
            return Ok(Reply::Failure { status: status.as_u16(), body: truncate_body(&body) });
        }

        let data = serde_json::from_str(&body)
            .map_err(|source| UpstreamError::Decode { endpoint, source })?;

        Ok(Reply::Success { status: status.as_u16(), data })
    }

    async fn by_coordinates<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        at: Location,
    ) -> Result<Reply<T>, UpstreamError> {
        let api_key = self.api_key()?;
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();

        self.get(
            endpoint,
            path,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ],
        )
        .await
    }
}

#[async_trait]
impl UpstreamProvider for OpenWeatherClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn geocode(&self, query: &str, limit: u8) -> Result<Reply<Vec<CityMatch>>, UpstreamError> {
        let api_key = self.api_key()?;
        let limit = limit.to_string();

        self.get(
            "OpenWeather geocoding",
            GEOCODE_PATH,
            &[("q", query), ("limit", limit.as_str()), ("appid", api_key)],
        )
        .await
    }

    async fn current(&self, at: Location) -> Result<Reply<CurrentConditions>, UpstreamError> {
        self.by_coordinates("OpenWeather current weather", CURRENT_PATH, at).await
    }

    async fn forecast(&self, at: Location) -> Result<Reply<ForecastSeries>, UpstreamError> {
        self.by_coordinates("OpenWeather 5-day forecast", FORECAST_PATH, at).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
