//! Data models for the DadWear application
//!
//! This module contains the core domain models organized by concern:
//! - Reading: Normalized weather reading for one request
//! - Forecast: Forecast points and chart-ready series entries
//! - Recommendation: Categorized clothing recommendations

pub mod forecast;
pub mod reading;
pub mod recommendation;

// Re-export all public types for convenient access
pub use forecast::{ChartPoint, ForecastPoint, TemperatureSeries};
pub use reading::{TimeOfDay, WeatherReading};
pub use recommendation::{Category, Recommendation};
