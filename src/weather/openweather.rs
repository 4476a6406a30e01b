//! OpenWeatherMap 2.5 response payloads
//!
//! Every field is optional on the wire; conversion decides what is fatal
//! (no temperature in the current conditions) and what is skipped.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::{ForecastPoint, WeatherReading};
use crate::{DadWearError, Result};

#[derive(Debug, Deserialize)]
pub struct Coord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Coord {
    /// Both values present and finite
    fn pair(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    /// Group name such as "Rain", "Snow" or "Clear"
    pub main: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
}

/// `/weather` response
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub coord: Option<Coord>,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub main: Option<MainBlock>,
    pub wind: Option<Wind>,
    pub dt: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt: Option<i64>,
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

/// `/forecast` response
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

fn condition_label(weather: &[Condition]) -> String {
    weather
        .first()
        .and_then(|c| c.main.as_deref())
        .map(|main| main.trim().to_lowercase())
        .filter(|main| !main.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn timestamp(dt: Option<i64>) -> Option<DateTime<Utc>> {
    dt.filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

impl CurrentResponse {
    /// Normalize into a reading; a missing temperature is an upstream error
    pub fn into_reading(self) -> Result<WeatherReading> {
        let main = self
            .main
            .ok_or_else(|| DadWearError::api("Weather response has no temperature block"))?;
        let temperature = main
            .temp
            .ok_or_else(|| DadWearError::api("Weather response has no temperature"))?;
        let feels_like = main.feels_like.unwrap_or(temperature);
        let wind_speed = self.wind.and_then(|w| w.speed).unwrap_or(0.0);

        let mut reading = WeatherReading::new(
            temperature,
            feels_like,
            &condition_label(&self.weather),
            wind_speed,
        )
        .with_location(self.name.unwrap_or_else(|| "Unknown".to_string()));

        reading.humidity = main
            .humidity
            .map_or(0, |h| h.round().clamp(0.0, 100.0) as u8);
        if let Some(observed_at) = timestamp(self.dt) {
            reading.observed_at = observed_at;
        }
        reading.coordinates = self.coord.as_ref().and_then(Coord::pair);
        if reading.coordinates.is_none() {
            warn!("Weather response for {} has no usable coordinates", reading.location);
        }

        Ok(reading)
    }
}

impl ForecastResponse {
    /// Valid points in time order; entries without a timestamp or
    /// temperature are logged and dropped
    #[must_use]
    pub fn into_points(self) -> Vec<ForecastPoint> {
        let mut points: Vec<ForecastPoint> = self
            .list
            .into_iter()
            .filter_map(|item| {
                let Some(at) = timestamp(item.dt) else {
                    warn!("Skipping forecast point with invalid timestamp {:?}", item.dt);
                    return None;
                };
                let Some(temperature) = item.main.as_ref().and_then(|m| m.temp) else {
                    warn!("Skipping forecast point at {} without temperature", at);
                    return None;
                };
                let feels_like = item
                    .main
                    .as_ref()
                    .and_then(|m| m.feels_like)
                    .unwrap_or(temperature);
                Some(ForecastPoint {
                    timestamp: at,
                    temperature,
                    feels_like,
                    conditions: condition_label(&item.weather),
                })
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);
        points
    }
}
