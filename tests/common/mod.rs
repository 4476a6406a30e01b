//! Shared fixtures: mocked weather and LLM upstreams plus a wired-up app
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use dadwear::api::AppState;
use dadwear::config::{LlmConfig, WeatherConfig};
use dadwear::{Advisor, AvailabilityMonitor, DadWearConfig, WeatherClient, llm, web};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Upstreams {
    pub weather: MockServer,
    pub llm: MockServer,
}

/// `/weather` payload for New York observed now
pub fn current_body(temp: f64, feels_like: f64, main: &str, wind: f64) -> Value {
    json!({
        "coord": {"lon": -73.99, "lat": 40.75},
        "weather": [{"id": 800, "main": main, "description": main.to_lowercase()}],
        "main": {"temp": temp, "feels_like": feels_like, "humidity": 55},
        "wind": {"speed": wind},
        "dt": Utc::now().timestamp(),
        "name": "New York"
    })
}

/// `/forecast` payload with points `hours` hours from now
pub fn forecast_body(points: &[(i64, f64)]) -> Value {
    let now = Utc::now().timestamp();
    let list: Vec<Value> = points
        .iter()
        .map(|(hours, temp)| {
            json!({
                "dt": now + hours * 3600,
                "main": {"temp": temp, "feels_like": temp - 1.0},
                "weather": [{"main": "Clear"}]
            })
        })
        .collect();
    json!({"cnt": list.len(), "list": list})
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "mistral",
        "message": {"role": "assistant", "content": content},
        "done": true
    }))
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            weather: MockServer::start().await,
            llm: MockServer::start().await,
        }
    }

    pub async fn mount_weather(&self, current: Value, forecast: Value) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current))
            .mount(&self.weather)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast))
            .mount(&self.weather)
            .await;
    }

    pub async fn mount_weather_failure(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.weather)
            .await;
    }

    pub async fn mount_llm_healthy(&self) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&self.llm)
            .await;
    }

    /// Answer chat requests whose prompt contains `marker`
    pub async fn mount_chat(&self, marker: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_string_contains(marker))
            .respond_with(chat_reply(content))
            .mount(&self.llm)
            .await;
    }

    /// Health endpoint hits recorded by the LLM mock so far
    pub async fn health_probes(&self) -> usize {
        self.llm
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == "/api/tags")
            .count()
    }

    pub fn config(&self) -> DadWearConfig {
        DadWearConfig {
            weather: WeatherConfig {
                api_key: Some("test-key".to_string()),
                base_url: self.weather.uri(),
                ..WeatherConfig::default()
            },
            llm: LlmConfig {
                base_url: self.llm.uri(),
                health_attempts: 1,
                health_retry_delay_ms: 0,
                ..LlmConfig::default()
            },
            ..DadWearConfig::default()
        }
    }

    /// State with availability already probed once
    pub async fn state(&self) -> AppState {
        let config = self.config();
        let backend = llm::build_backend(&config.llm).unwrap();
        let monitor = Arc::new(AvailabilityMonitor::new(Arc::clone(&backend), &config.llm));
        monitor.check().await;

        let advisor = Advisor::new(
            WeatherClient::new(&config.weather).unwrap(),
            backend,
            monitor.handle(),
            config.display_timezone(),
        );
        AppState {
            advisor: Arc::new(advisor),
            monitor,
            default_zip: config.server.default_zip.clone(),
        }
    }

    pub async fn app(&self) -> Router {
        let state = self.state().await;
        web::app(state, &self.config())
    }
}
