use serde::{Deserialize, Serialize};

/// Icon category for a provider weather-condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Clear,
    Cloudy,
    Default,
}

impl WeatherIcon {
    /// Map an OpenWeather condition code to an icon.
    /// See: https://openweathermap.org/weather-conditions
    ///
    /// Atmosphere codes (7xx) and anything outside the table fall back to `Default`.
    pub fn classify(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            800 => Self::Clear,
            801.. => Self::Cloudy,
            _ => Self::Default,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Default => "default",
        }
    }

    /// Single glyph used by the terminal renderer.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "⛈",
            Self::Drizzle => "🌦",
            Self::Rain => "🌧",
            Self::Snow => "❄",
            Self::Clear => "☀",
            Self::Cloudy => "☁",
            Self::Default => "🌥",
        }
    }
}

impl std::fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
