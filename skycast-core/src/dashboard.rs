//! Dashboard controller.
//!
//! UI input is turned into [`Event`]s and fed through a channel to a single
//! [`Dashboard`], which owns the [`AppState`]. Timers (search debounce, blur grace)
//! post their own events back into the same channel.

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::client::WeatherSource;
use crate::config::DashboardConfig;
use crate::debounce::Debouncer;
use crate::favorites::{Favorite, Favorites};
use crate::model::{CityMatch, Location, WeatherBundle};

/// Banner shown when a weather load fails.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load weather data. Please check your API key.";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The search box now contains this text.
    SearchInput(String),
    /// Debounce timer fired for this query.
    SearchDue(String),
    /// The search box lost focus.
    SearchBlur,
    /// Blur grace period elapsed.
    HideResults,
    SelectResult(usize),
    Refresh,
    SaveFavorite,
    OpenFavorite(usize),
    RemoveFavorite(usize),
    Quit,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub location: Location,
    pub input: String,
    pub results: Vec<CityMatch>,
    pub results_visible: bool,
    /// Last successfully loaded weather; replaced only as a whole.
    pub weather: Option<WeatherBundle>,
    pub banner: Option<String>,
    pub favorites: Favorites,
}

impl AppState {
    pub fn new(location: Location, favorites: Favorites) -> Self {
        Self {
            location,
            input: String::new(),
            results: Vec::new(),
            results_visible: false,
            weather: None,
            banner: None,
            favorites,
        }
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.results_visible = false;
    }
}

#[derive(Debug)]
pub struct Dashboard {
    state: AppState,
    source: Arc<dyn WeatherSource>,
    /// Location the current weather bundle was fetched for.
    loaded_at: Option<Location>,
    events: UnboundedSender<Event>,
    search: Debouncer<Event>,
    blur: Debouncer<Event>,
}

impl Dashboard {
    /// Build a controller and the receiving end of its event channel.
    ///
    /// Feed UI events through [`Dashboard::sender`] and pass the receiver to
    /// [`Dashboard::run`].
    pub fn new(
        config: &DashboardConfig,
        source: Arc<dyn WeatherSource>,
        favorites: Favorites,
    ) -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let dashboard = Self {
            state: AppState::new(config.default_location, favorites),
            source,
            loaded_at: None,
            search: Debouncer::new(config.search_debounce(), tx.clone()),
            blur: Debouncer::new(config.blur_grace(), tx.clone()),
            events: tx,
        };

        (dashboard, rx)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn sender(&self) -> UnboundedSender<Event> {
        self.events.clone()
    }

    /// Load the initial location, then process events until [`Event::Quit`] arrives.
    ///
    /// `render` is called after the initial load and after every event that changed
    /// what is on screen.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<Event>,
        mut render: impl FnMut(&AppState),
    ) -> AppState {
        self.load_weather().await;
        render(&self.state);

        while let Some(event) = events.recv().await {
            if event == Event::Quit {
                break;
            }
            if self.handle(event).await {
                render(&self.state);
            }
        }

        self.search.cancel();
        self.blur.cancel();
        self.state
    }

    /// Apply one event. Returns whether the visible state changed.
    pub async fn handle(&mut self, event: Event) -> bool {
        tracing::trace!(?event, "Dashboard event");

        match event {
            Event::SearchInput(text) => {
                let query = text.trim().to_string();
                self.state.input = text;

                if query.is_empty() {
                    self.search.cancel();
                    let was_visible = self.state.results_visible;
                    self.state.clear_results();
                    return was_visible;
                }

                self.search.schedule(Event::SearchDue(query));
                false
            }
            Event::SearchDue(query) => self.search_now(&query).await,
            Event::SearchBlur => {
                self.blur.schedule(Event::HideResults);
                false
            }
            Event::HideResults => {
                let was_visible = self.state.results_visible;
                self.state.results_visible = false;
                was_visible
            }
            Event::SelectResult(index) => {
                if !self.state.results_visible {
                    return false;
                }
                let Some(city) = self.state.results.get(index) else {
                    return false;
                };

                self.state.location = Location::from(city);
                self.state.input.clear();
                self.state.clear_results();
                self.load_weather().await;
                true
            }
            Event::Refresh => {
                self.load_weather().await;
                true
            }
            Event::SaveFavorite => self.save_favorite(),
            Event::OpenFavorite(index) => {
                let Some(favorite) = self.state.favorites.get(index) else {
                    return false;
                };

                self.state.location = favorite.location;
                self.load_weather().await;
                true
            }
            Event::RemoveFavorite(index) => match self.state.favorites.remove(index) {
                Ok(removed) => removed.is_some(),
                Err(err) => {
                    tracing::error!("Failed to remove favorite: {err:#}");
                    false
                }
            },
            Event::Quit => false,
        }
    }

    async fn search_now(&mut self, query: &str) -> bool {
        match self.source.search(query).await {
            Ok(matches) => {
                tracing::debug!(query, count = matches.len(), "Search results");
                self.state.results = matches;
                self.state.results_visible = true;
                true
            }
            Err(err) => {
                tracing::error!(query, "Search error: {err:#}");
                false
            }
        }
    }

    /// Fetch weather for the current location. Success replaces the bundle and clears the
    /// banner; failure only sets the banner.
    pub async fn load_weather(&mut self) {
        let at = self.state.location;

        match self.source.weather(at).await {
            Ok(bundle) => {
                tracing::info!(city = %bundle.current.name, points = bundle.forecast.len(), "Weather loaded");
                self.state.weather = Some(bundle);
                self.state.banner = None;
                self.loaded_at = Some(at);
            }
            Err(err) => {
                tracing::error!(%at, "Error loading weather: {err:#}");
                self.state.banner = Some(LOAD_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Save the current location, named after its city once its weather has loaded.
    fn save_favorite(&mut self) -> bool {
        let location = self.state.location;
        let name = self
            .state
            .weather
            .as_ref()
            .filter(|_| self.loaded_at == Some(location))
            .map(|w| w.current.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| location.to_string());

        match self.state.favorites.add(Favorite { name, location }) {
            Ok(added) => added,
            Err(err) => {
                tracing::error!("Failed to save favorite: {err:#}");
                false
            }
        }
    }
}
