use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::net::TcpListener;

use skycast_core::{
    AppState, Config, DashboardView, Favorites, Location, OpenWeatherClient, ProxyClient,
    ProxyService, WeatherSource, server,
};

use crate::terminal;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather proxy and dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Run the weather proxy endpoint.
    Serve {
        /// Address to bind, e.g. "0.0.0.0:3000". Defaults to the configured one.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the dashboard once for a location.
    Show {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// City name; the first geocoding match is used.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,
    },

    /// Look up cities by name through the proxy.
    Search {
        query: String,
    },

    /// Manage saved locations.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Interactive dashboard. Type to search; see `/help` for commands.
    Dashboard,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List saved locations.
    List,
    /// Remove the saved location at a 1-based position.
    Remove { position: usize },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => {
                let api_key = inquire::Password::new("OpenWeather API key:")
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                config.set_api_key(api_key.trim().to_string());
                config.save()?;
                println!("Saved API key to {}", Config::config_file_path()?.display());
            }
            Command::Serve { bind } => {
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                let api_key = config.api_key();
                if api_key.is_none() {
                    tracing::warn!(
                        "No API key configured; every request will fail until WEATHER_API_KEY is set \
                         or `skycast configure` is run"
                    );
                }

                let upstream =
                    OpenWeatherClient::new(api_key).with_base_url(config.upstream.base_url.clone());
                let service = Arc::new(ProxyService::new(Arc::new(upstream)));
                let listener = TcpListener::bind(&bind)
                    .await
                    .with_context(|| format!("Failed to bind {bind}"))?;

                server::serve(listener, service).await?;
            }
            Command::Show { lat, lon, city } => {
                let client = ProxyClient::new(&config.dashboard.proxy_url);

                let at = match (lat, lon, city) {
                    (Some(lat), Some(lon), _) => Location::new(lat, lon),
                    (_, _, Some(city)) => {
                        let matches = client.search(&city).await?;
                        let first = matches
                            .first()
                            .ok_or_else(|| anyhow!("No city found matching '{city}'"))?;
                        Location::from(first)
                    }
                    _ => config.dashboard.default_location,
                };

                let mut state = AppState::new(at, Favorites::in_memory());
                state.weather = Some(client.weather(at).await?);
                print!("{}", DashboardView::build(&state, &Local));
            }
            Command::Search { query } => {
                let client = ProxyClient::new(&config.dashboard.proxy_url);
                let matches = client.search(&query).await?;

                if matches.is_empty() {
                    println!("No matches for '{query}'.");
                }
                for city in matches {
                    println!("{} ({})  {:.4}, {:.4}", city.name, city.region_line(), city.lat, city.lon);
                }
            }
            Command::Favorites { action } => {
                let mut favorites = Favorites::load(Config::favorites_file_path()?);

                match action {
                    FavoritesAction::List => {
                        if favorites.is_empty() {
                            println!("No favorites saved.");
                        }
                        for (i, fav) in favorites.items().iter().enumerate() {
                            println!("({}) {}  {}", i + 1, fav.name, fav.location);
                        }
                    }
                    FavoritesAction::Remove { position } => {
                        let removed = position
                            .checked_sub(1)
                            .map(|index| favorites.remove(index))
                            .transpose()?
                            .flatten()
                            .ok_or_else(|| anyhow!("No favorite at position {position}"))?;
                        println!("Removed {}", removed.name);
                    }
                }
            }
            Command::Dashboard => {
                let favorites = Favorites::load(Config::favorites_file_path()?);
                terminal::run(&config, favorites).await?;
            }
        }

        Ok(())
    }
}
