//! `DadWear` - "Dad, Can I Wear This?"
//!
//! Turns a US ZIP code into current weather, safety warnings and a clothing
//! list. A rule table always produces the baseline; an LLM, when reachable,
//! writes the summary and adds to the clothing list.

pub mod advisor;
pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod rules;
pub mod summary;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use advisor::{Advice, Advisor};
pub use availability::{Availability, AvailabilityMonitor, AvailabilityState};
pub use config::DadWearConfig;
pub use error::DadWearError;
pub use llm::{AiReply, ChatBackend, Generated};
pub use models::{Category, Recommendation, TemperatureSeries, WeatherReading};
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DadWearError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
