//! Weather reading model shared by the rule tables, the summary generator and
//! the reconciler

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ForecastPoint;

/// Conditions that call for rain gear
const WET_CONDITIONS: [&str; 3] = ["rain", "drizzle", "thunderstorm"];
/// Conditions that call for insulated waterproof footwear
const FROZEN_CONDITIONS: [&str; 2] = ["snow", "sleet"];
/// Conditions with sun exposure
const FAIR_CONDITIONS: [&str; 2] = ["clear", "clouds"];

/// Coarse part of the day a reading was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket a local wall-clock hour (0-23)
    #[must_use]
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// Time of day of `instant` in the given zone
    #[must_use]
    pub fn at<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> Self {
        Self::from_hour(instant.with_timezone(tz).hour())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        };
        f.write_str(name)
    }
}

/// Current conditions for one location, normalized to imperial units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Location name reported by the provider
    pub location: String,
    /// Observation time
    pub observed_at: DateTime<Utc>,
    /// Provider coordinates as (latitude, longitude), when reported
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coordinates: Option<(f64, f64)>,
    /// Temperature in °F
    pub temperature: f64,
    /// Apparent temperature in °F
    pub feels_like: f64,
    /// Lowercase condition label ("rain", "snow", "clear", ...)
    pub conditions: String,
    /// Wind speed in mph
    pub wind_speed: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    /// Upcoming forecast points, oldest first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub forecast: Vec<ForecastPoint>,
}

impl WeatherReading {
    /// Reading with the four fields the rule tables look at; the rest is blank
    #[must_use]
    pub fn new(temperature: f64, feels_like: f64, conditions: &str, wind_speed: f64) -> Self {
        Self {
            location: String::new(),
            observed_at: Utc::now(),
            coordinates: None,
            temperature,
            feels_like,
            conditions: conditions.trim().to_lowercase(),
            wind_speed,
            humidity: 0,
            time_of_day: None,
            forecast: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, name: impl Into<String>) -> Self {
        self.location = name.into();
        self
    }

    #[must_use]
    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    #[must_use]
    pub fn with_forecast(mut self, forecast: Vec<ForecastPoint>) -> Self {
        self.forecast = forecast;
        self
    }

    /// Rain, drizzle or thunderstorm
    #[must_use]
    pub fn is_wet(&self) -> bool {
        WET_CONDITIONS.contains(&self.conditions.as_str())
    }

    /// Snow or sleet
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        FROZEN_CONDITIONS.contains(&self.conditions.as_str())
    }

    /// Clear or cloudy skies
    #[must_use]
    pub fn is_fair(&self) -> bool {
        FAIR_CONDITIONS.contains(&self.conditions.as_str())
    }

    /// Absolute gap between actual and apparent temperature
    #[must_use]
    pub fn feels_like_gap(&self) -> f64 {
        (self.temperature - self.feels_like).abs()
    }
}
