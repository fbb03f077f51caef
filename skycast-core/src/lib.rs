//! Core library for `skycast`.
//!
//! This crate defines:
//! - The proxy endpoint that fronts the OpenWeather geocoding and weather APIs
//! - Forecast shaping (hourly strip, daily buckets) and icon classification
//! - The dashboard controller, its debounced search and the favorites list
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but the proxy router can be mounted by other services.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod favorites;
pub mod forecast;
pub mod icon;
pub mod model;
pub mod provider;
pub mod proxy;
pub mod server;
pub mod view;

pub use client::{ProxyClient, WeatherSource};
pub use config::Config;
pub use dashboard::{AppState, Dashboard, Event};
pub use favorites::{Favorite, Favorites};
pub use icon::WeatherIcon;
pub use model::{CityMatch, CurrentConditions, ForecastPoint, Location, WeatherBundle};
pub use provider::{OpenWeatherClient, UpstreamProvider};
pub use proxy::{ProxyError, ProxyQuery, ProxyService};
pub use view::DashboardView;
