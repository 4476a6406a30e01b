//! Dad, Can I Wear This? - web server

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dadwear::api::AppState;
use dadwear::{Advisor, AvailabilityMonitor, DadWearConfig, WeatherClient, llm, logging, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = DadWearConfig::load()?;
    logging::init(&config.logging)?;

    tracing::info!("Starting dadwear v{}", dadwear::VERSION);

    let weather = WeatherClient::new(&config.weather).context("Weather client setup failed")?;
    let backend = llm::build_backend(&config.llm).context("LLM client setup failed")?;

    let monitor = Arc::new(if config.llm.enabled {
        AvailabilityMonitor::new(Arc::clone(&backend), &config.llm)
    } else {
        tracing::info!("LLM disabled, serving rule-based recommendations only");
        AvailabilityMonitor::disabled()
    });

    let available = monitor.check().await;
    tracing::info!("Initial LLM availability: {}", available);
    if config.llm.enabled {
        monitor.spawn_refresh(Duration::from_secs(config.llm.recheck_interval_seconds));
    }

    let advisor = Advisor::new(
        weather,
        backend,
        monitor.handle(),
        config.display_timezone(),
    );

    let state = AppState {
        advisor: Arc::new(advisor),
        monitor,
        default_zip: config.server.default_zip.clone(),
    };

    web::run(&config, state).await
}
