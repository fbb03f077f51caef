use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{favorites::FAVORITES_FILE, model::Location, provider::openweather::DEFAULT_BASE_URL};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Upstream provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: DEFAULT_BASE_URL.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the proxy binds to, e.g. "127.0.0.1:3000".
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:3000".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the proxy the dashboard talks to.
    pub proxy_url: String,
    pub default_location: Location,
    pub search_debounce_ms: u64,
    pub blur_grace_ms: u64,
}

impl DashboardConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            proxy_url: "http://127.0.0.1:3000".to_string(),
            default_location: Location::MADRID,
            search_debounce_ms: 300,
            blur_grace_ms: 200,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [upstream]
/// api_key = "..."
///
/// [dashboard]
/// default_location = { lat = 37.5665, lon = 126.978 }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::parse(
            &fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?,
        )
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn favorites_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join(FAVORITES_FILE))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.upstream.api_key = Some(api_key);
    }

    /// API key from `WEATHER_API_KEY`, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), self.upstream.api_key.as_deref())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "skycast", "skycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

fn pick_api_key(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| file.filter(|k| !k.trim().is_empty()).map(str::to_string))
}
