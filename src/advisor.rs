//! Request pipeline: one ZIP code in, everything the page shows out

use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use crate::Result;
use crate::availability::Availability;
use crate::llm::ChatBackend;
use crate::models::{Recommendation, TemperatureSeries, TimeOfDay, WeatherReading};
use crate::reconcile::recommend_clothing;
use crate::rules::safety_warnings;
use crate::summary::{DayOutlook, outlook_html, summarize};
use crate::weather::{WeatherClient, validate_zip};

/// Everything rendered for one request
#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub zip: String,
    pub reading: WeatherReading,
    pub summary: String,
    /// Pre-escaped HTML fragment
    pub outlook_html: String,
    pub safety: Vec<String>,
    pub clothing: Vec<Recommendation>,
    pub chart: TemperatureSeries,
    /// Whether any model output made it into this advice
    pub ai_used: bool,
}

pub struct Advisor {
    weather: WeatherClient,
    backend: Arc<dyn ChatBackend>,
    availability: Availability,
    tz: Tz,
}

impl Advisor {
    #[must_use]
    pub fn new(
        weather: WeatherClient,
        backend: Arc<dyn ChatBackend>,
        availability: Availability,
        tz: Tz,
    ) -> Self {
        Self {
            weather,
            backend,
            availability,
            tz,
        }
    }

    #[must_use]
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    async fn reading(&self, zip: &str) -> Result<WeatherReading> {
        let mut reading = self.weather.reading_with_forecast(zip).await?;
        reading.time_of_day = Some(TimeOfDay::at(reading.observed_at, &self.tz));
        Ok(reading)
    }

    /// Full advice for a ZIP code. Only an invalid ZIP code or failed
    /// current-conditions fetch is an error; AI trouble degrades silently.
    #[instrument(skip(self))]
    pub async fn advise(&self, zip_input: &str) -> Result<Advice> {
        let start_time = Instant::now();
        let zip = validate_zip(zip_input)?;
        let reading = self.reading(&zip).await?;
        let today = Utc::now().with_timezone(&self.tz).date_naive();

        let outlook = DayOutlook::build(&reading, today, &self.tz);
        let safety = safety_warnings(&reading);
        let backend = self.backend.as_ref();

        let (summary, outlook_fragment, clothing) = tokio::join!(
            summarize(&reading, &outlook, backend, &self.availability),
            outlook_html(&reading, &outlook, backend, &self.availability),
            recommend_clothing(&reading, &safety, backend, &self.availability),
        );

        let ai_used = summary.from_ai || outlook_fragment.from_ai || clothing.from_ai;
        let chart = TemperatureSeries::build(&reading, today, &self.tz);

        info!(
            "Advice for {} ({}) ready in {:.3}s, ai_used={}",
            zip,
            reading.location,
            start_time.elapsed().as_secs_f64(),
            ai_used
        );

        Ok(Advice {
            zip,
            reading,
            summary: summary.value,
            outlook_html: outlook_fragment.value,
            safety,
            clothing: clothing.value,
            chart,
            ai_used,
        })
    }

    /// Chart data only: current point plus the rest of today's forecast
    #[instrument(skip(self))]
    pub async fn temperature_series(&self, zip_input: &str) -> Result<TemperatureSeries> {
        let zip = validate_zip(zip_input)?;
        let reading = self.reading(&zip).await?;
        let today = Utc::now().with_timezone(&self.tz).date_naive();
        Ok(TemperatureSeries::build(&reading, today, &self.tz))
    }
}
