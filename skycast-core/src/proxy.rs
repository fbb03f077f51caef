//! Request dispatch for the proxy endpoint.
//!
//! A request carries either a free-text `q` (geocoding) or a `lat`/`lon` pair
//! (current conditions plus forecast). Each call is independent; nothing is cached.

use serde::Serialize;
use std::sync::Arc;

use crate::model::{CityMatch, Location, WeatherBundle};
use crate::provider::{Reply, UpstreamError, UpstreamProvider};

/// Number of geocoding matches requested from the provider.
pub const GEOCODE_LIMIT: u8 = 5;

/// Query parameters as received; parsing happens in [`ProxyService::handle`].
#[derive(Debug, Clone, Default)]
pub struct ProxyQuery {
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl ProxyQuery {
    pub fn search(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()), ..Self::default() }
    }

    pub fn coordinates(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self { q: None, lat: Some(lat.into()), lon: Some(lon.into()) }
    }

    /// Collect decoded `key=value` pairs. A repeated key keeps its first value; unknown
    /// keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut query.q,
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                _ => continue,
            };
            slot.get_or_insert(value);
        }

        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProxyPayload {
    Matches(Vec<CityMatch>),
    Weather(WeatherBundle),
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("API key not configured. Please set WEATHER_API_KEY.")]
    MissingApiKey,

    #[error("Missing required query parameters (q or lat/lon).")]
    MissingParameters,

    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    #[error("Invalid coordinates: lat={lat:?}, lon={lon:?}")]
    InvalidCoordinates { lat: String, lon: String },

    #[error("Failed to fetch data: {0}")]
    UpstreamStatus(String),

    #[error("Failed to fetch data: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    /// HTTP status the endpoint answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::MissingParameters
            | ProxyError::MalformedQuery(_)
            | ProxyError::InvalidCoordinates { .. } => 400,
            ProxyError::MissingApiKey
            | ProxyError::UpstreamStatus(_)
            | ProxyError::Upstream(_) => 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyService {
    upstream: Arc<dyn UpstreamProvider>,
}

impl ProxyService {
    pub fn new(upstream: Arc<dyn UpstreamProvider>) -> Self {
        Self { upstream }
    }

    pub async fn handle(&self, query: &ProxyQuery) -> Result<ProxyPayload, ProxyError> {
        if !self.upstream.has_credentials() {
            return Err(ProxyError::MissingApiKey);
        }

        if let Some(q) = present(&query.q) {
            return self.search(q).await.map(ProxyPayload::Matches);
        }

        match (present(&query.lat), present(&query.lon)) {
            (Some(lat), Some(lon)) => {
                let at = parse_location(lat, lon)?;
                self.weather(at).await.map(ProxyPayload::Weather)
            }
            _ => Err(ProxyError::MissingParameters),
        }
    }

    async fn search(&self, q: &str) -> Result<Vec<CityMatch>, ProxyError> {
        tracing::debug!(query = q, "Geocoding");

        let reply = self.upstream.geocode(q, GEOCODE_LIMIT).await?;
        let status = reply.status();

        reply.into_data().ok_or_else(|| {
            ProxyError::UpstreamStatus(format!("External Geo API failed with status {status}"))
        })
    }

    async fn weather(&self, at: Location) -> Result<WeatherBundle, ProxyError> {
        tracing::debug!(lat = at.lat, lon = at.lon, "Fetching current weather and forecast");

        let (current, forecast) =
            tokio::join!(self.upstream.current(at), self.upstream.forecast(at));
        let (current, forecast) = (current?, forecast?);

        match (current, forecast) {
            (Reply::Success { data: current, .. }, Reply::Success { data: forecast, .. }) => {
                Ok(WeatherBundle { current, forecast: forecast.list })
            }
            (current, forecast) => Err(ProxyError::UpstreamStatus(format!(
                "External Weather API failed with status {} or {}",
                current.status(),
                forecast.status()
            ))),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_location(lat: &str, lon: &str) -> Result<Location, ProxyError> {
    let parse = |v: &str| v.trim().parse::<f64>().ok().filter(|n| n.is_finite());

    match (parse(lat), parse(lon)) {
        (Some(lat), Some(lon)) => Ok(Location::new(lat, lon)),
        _ => Err(ProxyError::InvalidCoordinates { lat: lat.to_string(), lon: lon.to_string() }),
    }
}
