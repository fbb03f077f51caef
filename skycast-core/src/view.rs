//! Display model for the dashboard and its plain-text rendering.

use chrono::TimeZone;
use std::fmt;

use crate::dashboard::AppState;
use crate::forecast::{self, day_label, local_time};
use crate::icon::WeatherIcon;
use crate::model::{CurrentConditions, ForecastPoint};

/// UV index as far as the provider tier can tell us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UvIndex {
    Unavailable,
    Value(f64),
}

impl fmt::Display for UvIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UvIndex::Unavailable => f.write_str("n/a"),
            UvIndex::Value(v) => write!(f, "{v:.0}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentCard {
    pub city: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub wind_speed: f64,
    pub cloud_cover: u8,
    /// Percent, from the first forecast slot.
    pub chance_of_rain: Option<u8>,
    pub icon: WeatherIcon,
    pub description: String,
    pub uv_index: UvIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCell {
    pub time: String,
    pub icon: WeatherIcon,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub label: String,
    pub icon: WeatherIcon,
    pub description: String,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub banner: Option<String>,
    pub current: Option<CurrentCard>,
    pub hourly: Vec<HourlyCell>,
    pub daily: Vec<DailyRow>,
    /// (name, "region, country") per visible search result.
    pub results: Vec<(String, String)>,
    pub favorites: Vec<String>,
}

impl DashboardView {
    pub fn build<Tz: TimeZone>(state: &AppState, tz: &Tz) -> Self {
        let mut view = DashboardView {
            banner: state.banner.clone(),
            favorites: state.favorites.items().iter().map(|f| f.name.clone()).collect(),
            ..Default::default()
        };

        if state.results_visible {
            view.results =
                state.results.iter().map(|c| (c.name.clone(), c.region_line())).collect();
        }

        if let Some(bundle) = &state.weather {
            view.current = Some(current_card(&bundle.current, bundle.forecast.first()));
            view.hourly = forecast::hourly(&bundle.forecast)
                .iter()
                .filter_map(|p| hourly_cell(p, tz))
                .collect();
            view.daily = forecast::daily_buckets(&bundle.forecast, tz)
                .iter()
                .enumerate()
                .map(|(i, b)| DailyRow {
                    label: day_label(i, b),
                    icon: WeatherIcon::classify(b.code),
                    description: b.description.clone(),
                    max: round_temp(b.max()),
                    min: round_temp(b.min()),
                })
                .collect();
        }

        view
    }
}

fn current_card(current: &CurrentConditions, next: Option<&ForecastPoint>) -> CurrentCard {
    CurrentCard {
        city: current.name.clone(),
        temperature: round_temp(current.main.temp),
        feels_like: round_temp(current.main.feels_like),
        wind_speed: current.wind.speed,
        cloud_cover: current.clouds.all,
        chance_of_rain: next.and_then(|p| p.pop).map(|pop| (pop.clamp(0.0, 1.0) * 100.0).round() as u8),
        icon: WeatherIcon::classify(current.condition_code()),
        description: current.description().to_string(),
        uv_index: UvIndex::Unavailable,
    }
}

fn hourly_cell<Tz: TimeZone>(point: &ForecastPoint, tz: &Tz) -> Option<HourlyCell> {
    let time = local_time(point.dt, tz)?;
    Some(HourlyCell {
        time: time.naive_local().format("%-I:%M %p").to_string(),
        icon: WeatherIcon::classify(point.condition_code()),
        temperature: round_temp(point.main.temp),
    })
}

/// Half-way values round toward positive infinity (-2.5 -> -2).
pub fn round_temp(t: f64) -> i64 {
    (t + 0.5).floor() as i64
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "!! {banner}")?;
        }

        if !self.results.is_empty() {
            writeln!(f, "Search results:")?;
            for (i, (name, region)) in self.results.iter().enumerate() {
                writeln!(f, "  [{}] {name} ({region})", i + 1)?;
            }
        }

        let Some(current) = &self.current else {
            return writeln!(f, "No weather loaded yet.");
        };

        writeln!(f, "{} {}  {}°  {}", current.icon.glyph(), current.city, current.temperature, current.description)?;
        writeln!(f, "  Feels like   {}°", current.feels_like)?;
        writeln!(f, "  Wind         {:.1} m/s", current.wind_speed)?;
        writeln!(f, "  Cloud cover  {}%", current.cloud_cover)?;
        match current.chance_of_rain {
            Some(pop) => writeln!(f, "  Rain chance  {pop}%")?,
            None => writeln!(f, "  Rain chance  n/a")?,
        }
        writeln!(f, "  UV index     {}", current.uv_index)?;

        writeln!(f)?;
        for cell in &self.hourly {
            write!(f, "{:>9} {} {:>3}°", cell.time, cell.icon.glyph(), cell.temperature)?;
            writeln!(f)?;
        }

        writeln!(f)?;
        for row in &self.daily {
            writeln!(
                f,
                "{:<6} {} {:<24} {}/{}",
                row.label,
                row.icon.glyph(),
                row.description,
                row.max,
                row.min
            )?;
        }

        if !self.favorites.is_empty() {
            writeln!(f)?;
            writeln!(f, "Favorites:")?;
            for (i, name) in self.favorites.iter().enumerate() {
                writeln!(f, "  ({}) {name}", i + 1)?;
            }
        }

        Ok(())
    }
}
