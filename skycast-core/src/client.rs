//! Dashboard-side access to the proxy endpoint.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::model::{CityMatch, Location, WeatherBundle};
use crate::server::WEATHER_ROUTE;

/// Where the dashboard gets its data from.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Vec<CityMatch>>;

    async fn weather(&self, at: Location) -> Result<WeatherBundle>;
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), WEATHER_ROUTE),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, params: &[(&str, String)]) -> Result<T> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to reach weather proxy at {}", self.endpoint))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read weather proxy response body")?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(anyhow!("Weather proxy responded with status {status}: {message}"));
        }

        serde_json::from_str(&body).context("Failed to parse weather proxy JSON")
    }
}

#[async_trait]
impl WeatherSource for ProxyClient {
    async fn search(&self, query: &str) -> Result<Vec<CityMatch>> {
        self.get(&[("q", query.to_string())]).await
    }

    async fn weather(&self, at: Location) -> Result<WeatherBundle> {
        self.get(&[("lat", at.lat.to_string()), ("lon", at.lon.to_string())]).await
    }
}
