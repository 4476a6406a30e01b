use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::advisor::{Advice, Advisor};
use crate::availability::AvailabilityMonitor;
use crate::{DadWearError, VERSION};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
    pub monitor: Arc<AvailabilityMonitor>,
    pub default_zip: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub default_zip: String,
    pub version: &'static str,
}

#[derive(Template)]
#[template(path = "weather_response.html")]
pub struct WeatherResponseTemplate {
    pub zip: String,
    pub location: String,
    pub temperature: String,
    pub feels_like: String,
    pub conditions: String,
    pub summary: String,
    pub outlook_html: String,
    pub safety: Vec<String>,
    pub clothing: Vec<String>,
    pub chart_json: String,
    pub ai_used: bool,
}

#[derive(Template)]
#[template(path = "weather_error.html")]
pub struct WeatherErrorTemplate {
    pub message: String,
}

impl From<Advice> for WeatherResponseTemplate {
    fn from(advice: Advice) -> Self {
        // keeps a location name containing "</script>" inside the JSON block
        let chart_json = serde_json::to_string(&advice.chart.data)
            .unwrap_or_else(|_| "[]".to_string())
            .replace("</", "<\\/");
        Self {
            zip: advice.zip,
            location: advice.reading.location.clone(),
            temperature: format!("{:.0}", advice.reading.temperature),
            feels_like: format!("{:.0}", advice.reading.feels_like),
            conditions: advice.reading.conditions.clone(),
            summary: advice.summary,
            outlook_html: advice.outlook_html,
            safety: advice.safety,
            clothing: advice.clothing.iter().map(ToString::to_string).collect(),
            chart_json,
            ai_used: advice.ai_used,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherForm {
    #[serde(default)]
    pub zip_code: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
    ai_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_last_checked: Option<chrono::DateTime<chrono::Utc>>,
}

fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        error!("Template rendering failed: {}", e);
        "<p>Something went wrong rendering this page.</p>".to_string()
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/weather", post(weather))
        .route("/api/temperature-data/{zip_code}", get(temperature_data))
        .route("/health", get(health))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    render(&IndexTemplate {
        default_zip: state.default_zip.clone(),
        version: VERSION,
    })
}

async fn weather(State(state): State<AppState>, Form(form): Form<WeatherForm>) -> Html<String> {
    let page = match state.advisor.advise(&form.zip_code).await {
        Ok(advice) => render(&WeatherResponseTemplate::from(advice)),
        Err(e) => {
            log_failure(&form.zip_code, &e);
            render(&WeatherErrorTemplate {
                message: e.user_message(),
            })
        }
    };

    // best effort; the next request sees the refreshed flag
    state.monitor.spawn_check();
    page
}

async fn temperature_data(
    State(state): State<AppState>,
    Path(zip_code): Path<String>,
) -> Response {
    match state.advisor.temperature_series(&zip_code).await {
        Ok(series) => Json(series).into_response(),
        Err(e) => {
            log_failure(&zip_code, &e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: e.user_message(),
                }),
            )
                .into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let availability = state.advisor.availability().snapshot();
    Json(HealthBody {
        status: "ok",
        version: VERSION,
        ai_available: availability.available,
        ai_last_checked: availability.last_checked,
    })
}

fn log_failure(zip: &str, err: &DadWearError) {
    match err {
        DadWearError::Validation { .. } => warn!("Rejected request for '{}': {}", zip, err),
        _ => error!("Request for '{}' failed: {}", zip, err),
    }
}
