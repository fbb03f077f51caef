use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{CityMatch, CurrentConditions, ForecastSeries, Location};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Outcome of one upstream HTTP exchange that completed.
///
/// The body is only decoded on 2xx; any other status is carried as-is so the caller
/// can report it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success { status: u16, data: T },
    Failure { status: u16, body: String },
}

impl<T> Reply<T> {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Success { status, .. } | Reply::Failure { status, .. } => *status,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Reply::Success { data, .. } => Some(data),
            Reply::Failure { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("No API key configured for the weather provider")]
    MissingCredentials,

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse {endpoint} JSON: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The third-party weather and geocoding service behind the proxy.
#[async_trait]
pub trait UpstreamProvider: Send + Sync + Debug {
    /// Whether an API key is available. Checked before any request is made.
    fn has_credentials(&self) -> bool;

    async fn geocode(&self, query: &str, limit: u8) -> Result<Reply<Vec<CityMatch>>, UpstreamError>;

    async fn current(&self, at: Location) -> Result<Reply<CurrentConditions>, UpstreamError>;

    async fn forecast(&self, at: Location) -> Result<Reply<ForecastSeries>, UpstreamError>;
}
