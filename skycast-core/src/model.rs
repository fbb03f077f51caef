use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A point on the map the dashboard is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const MADRID: Location = Location { lat: 40.4168, lon: -3.7038 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::MADRID
    }
}

impl From<&CityMatch> for Location {
    fn from(city: &CityMatch) -> Self {
        Self { lat: city.lat, lon: city.lon }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// One geocoding hit. Fields we do not model (e.g. `local_names`) are kept in `extra`
/// so the proxy relays the provider's record untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMatch {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CityMatch {
    /// "Region, Country" line shown under the city name in search results.
    pub fn region_line(&self) -> String {
        match &self.state {
            Some(state) => format!("{state}, {}", self.country),
            None => self.country.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i32,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clouds {
    pub all: u8,
}

/// Provider "current weather" payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub dt: i64,
    pub main: Readings,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrentConditions {
    pub fn condition_code(&self) -> i32 {
        condition_code(&self.weather)
    }

    pub fn description(&self) -> &str {
        description(&self.weather)
    }
}

/// One entry of the 3-hour forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub dt: i64,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    /// Probability of precipitation, 0.0..=1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastPoint {
    pub fn condition_code(&self) -> i32 {
        condition_code(&self.weather)
    }

    pub fn description(&self) -> &str {
        description(&self.weather)
    }
}

/// Envelope of the provider forecast endpoint; only `list` reaches the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub list: Vec<ForecastPoint>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the proxy hands back for a coordinate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastPoint>,
}

fn condition_code(weather: &[Condition]) -> i32 {
    weather.first().map(|w| w.id).unwrap_or_default()
}

fn description(weather: &[Condition]) -> &str {
    weather.first().map(|w| w.description.as_str()).unwrap_or_default()
}
