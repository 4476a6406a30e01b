//! Forecast points and the chart-ready temperature series

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::WeatherReading;

/// One 3-hour forecast step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    /// Temperature in °F
    pub temperature: f64,
    /// Apparent temperature in °F
    pub feels_like: f64,
    /// Lowercase condition label
    pub conditions: String,
}

/// Entry of the temperature chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Local wall-clock label, `HH:MM`
    pub time: String,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub is_current: bool,
}

/// Chart payload: the current reading plus the rest of today's forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSeries {
    pub location: String,
    pub data: Vec<ChartPoint>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl ChartPoint {
    fn new<Tz: TimeZone>(
        at: DateTime<Utc>,
        temp: f64,
        feels_like: f64,
        is_current: bool,
        tz: &Tz,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            time: at.with_timezone(tz).format("%H:%M").to_string(),
            timestamp: at.timestamp_millis(),
            temp: round1(temp),
            feels_like: round1(feels_like),
            is_current,
        }
    }
}

impl TemperatureSeries {
    /// Build the series for `today` (a local date in `tz`), sorted by time
    #[must_use]
    pub fn build<Tz: TimeZone>(reading: &WeatherReading, today: NaiveDate, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut data = vec![ChartPoint::new(
            reading.observed_at,
            reading.temperature,
            reading.feels_like,
            true,
            tz,
        )];

        data.extend(
            reading
                .forecast
                .iter()
                .filter(|point| point.timestamp.with_timezone(tz).date_naive() == today)
                .map(|point| {
                    ChartPoint::new(point.timestamp, point.temperature, point.feels_like, false, tz)
                }),
        );

        data.sort_by_key(|point| point.timestamp);

        Self {
            location: reading.location.clone(),
            data,
        }
    }
}
