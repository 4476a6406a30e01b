//! OpenWeatherMap client: current conditions by ZIP code, forecast by
//! coordinates, imperial units throughout

use reqwest::{Client, Response, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::{ForecastPoint, WeatherReading};
use crate::{DadWearError, Result};

pub mod openweather;

/// Responses slower than this are logged (seconds)
const SLOW_RESPONSE_SECS: u64 = 5;

/// Normalize a US ZIP code, accepting ZIP+4 with or without the dash
pub fn validate_zip(input: &str) -> Result<String> {
    let normalized = input.trim().replace([' ', '-'], "");

    if normalized.is_empty() {
        return Err(DadWearError::validation("Please enter a ZIP code"));
    }

    if (normalized.len() == 5 || normalized.len() == 9)
        && normalized.chars().all(|c| c.is_ascii_digit())
    {
        return Ok(normalized[..5].to_string());
    }

    Err(DadWearError::validation(format!(
        "'{}' is not a US ZIP code (expected 5 digits)",
        input.trim()
    )))
}

/// Client for the OpenWeatherMap 2.5 API
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    forecast_points: u32,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DadWearError::config(
                    "No OpenWeatherMap API key configured (set OPENWEATHER_API_KEY)",
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("dadwear/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DadWearError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            forecast_points: config.forecast_points,
        })
    }

    /// Current conditions for a (validated) ZIP code
    #[instrument(skip(self))]
    pub async fn current_by_zip(&self, zip: &str) -> Result<WeatherReading> {
        info!("Getting current weather for ZIP {}", zip);
        let start_time = Instant::now();

        let url = format!(
            "{}/weather?zip={}&units=imperial&appid={}",
            self.base_url,
            urlencoding::encode(&format!("{zip},us")),
            self.api_key
        );
        let response = self.get(&url).await.map_err(|e| match e {
            DadWearError::Validation { .. } => {
                DadWearError::validation(format!("No location found for ZIP code {zip}"))
            }
            other => other,
        })?;

        let payload: openweather::CurrentResponse = response.json().await.map_err(|e| {
            error!("Failed to parse current weather response: {}", e);
            DadWearError::api("Invalid weather data received from OpenWeatherMap")
        })?;
        let reading = payload.into_reading()?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved current weather for {} in {:.3}s",
            reading.location,
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > SLOW_RESPONSE_SECS {
            warn!(
                "Slow weather API response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(reading)
    }

    /// 3-hour forecast points for the coordinates of a reading
    #[instrument(skip(self))]
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastPoint>> {
        info!("Getting forecast for coordinates: {:.4}, {:.4}", lat, lon);
        let start_time = Instant::now();

        let url = format!(
            "{}/forecast?lat={}&lon={}&units=imperial&cnt={}&appid={}",
            self.base_url, lat, lon, self.forecast_points, self.api_key
        );
        let response = self.get(&url).await?;

        let payload: openweather::ForecastResponse = response.json().await.map_err(|e| {
            error!("Failed to parse forecast response: {}", e);
            DadWearError::api("Invalid forecast data received from OpenWeatherMap")
        })?;
        let points = payload.into_points();

        info!(
            "Retrieved forecast with {} data points in {:.3}s",
            points.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(points)
    }

    /// Current conditions plus forecast. Only the current conditions are
    /// required; a failed forecast leaves the reading without one.
    pub async fn reading_with_forecast(&self, zip: &str) -> Result<WeatherReading> {
        let reading = self.current_by_zip(zip).await?;
        let Some((lat, lon)) = reading.coordinates else {
            warn!("No coordinates for {}, skipping forecast", reading.location);
            return Ok(reading);
        };
        let forecast = match self.forecast(lat, lon).await {
            Ok(points) => points,
            Err(e) => {
                warn!("Forecast unavailable for {}: {}", reading.location, e);
                Vec::new()
            }
        };
        Ok(reading.with_forecast(forecast))
    }

    async fn get(&self, url: &str) -> Result<Response> {
        debug!(
            "OpenWeatherMap request: {}",
            url.split("&appid=").next().unwrap_or(url)
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Weather API network error: {}", e);
            DadWearError::from(e)
        })?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(response),
            StatusCode::NOT_FOUND => {
                warn!("Location not found (HTTP 404)");
                Err(DadWearError::validation("No weather data found for that location"))
            }
            StatusCode::UNAUTHORIZED => {
                error!("Weather API authentication failed (HTTP 401)");
                Err(DadWearError::config(
                    "Invalid OpenWeatherMap API key (HTTP 401)",
                ))
            }
            _ => {
                warn!("Weather API request failed with status {}", status);
                Err(DadWearError::api(format!(
                    "Weather API request failed with status: {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WeatherClient {
        let config = WeatherConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            ..WeatherConfig::default()
        };
        WeatherClient::new(&config).unwrap()
    }

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "coord": {"lon": -73.99, "lat": 40.75},
            "weather": [{"main": "Clear"}],
            "main": {"temp": 71.2, "feels_like": 70.5, "humidity": 40},
            "wind": {"speed": 4.6},
            "dt": 1_720_000_000,
            "name": "New York"
        })
    }

    #[rstest]
    #[case("10001", "10001")]
    #[case(" 02139 ", "02139")]
    #[case("10001-1234", "10001")]
    #[case("100011234", "10001")]
    fn test_validate_zip_accepts(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_zip(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("1234")]
    #[case("ABCDE")]
    #[case("10001-12")]
    #[case("SW1A 1AA")]
    fn test_validate_zip_rejects(#[case] input: &str) {
        assert!(matches!(
            validate_zip(input),
            Err(DadWearError::Validation { .. })
        ));
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = WeatherConfig {
            api_key: Some("  ".to_string()),
            ..WeatherConfig::default()
        };
        assert!(matches!(
            WeatherClient::new(&config),
            Err(DadWearError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_current_by_zip_sends_imperial_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("zip", "10001,us"))
            .and(query_param("units", "imperial"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&server)
            .await;

        let reading = client(&server).current_by_zip("10001").await.unwrap();
        assert_eq!(reading.location, "New York");
        assert_eq!(reading.conditions, "clear");
        assert_eq!(reading.coordinates, Some((40.75, -73.99)));
    }

    #[tokio::test]
    async fn test_unknown_zip_is_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server).current_by_zip("00000").await.unwrap_err();
        assert!(matches!(err, DadWearError::Validation { .. }));
        assert!(err.user_message().contains("00000"));
    }

    #[tokio::test]
    async fn test_rejected_key_is_config_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).current_by_zip("10001").await.unwrap_err();
        assert!(matches!(err, DadWearError::Config { .. }));
    }

    #[tokio::test]
    async fn test_forecast_requests_point_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("lat", "40.75"))
            .and(query_param("lon", "-73.99"))
            .and(query_param("cnt", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [
                    {"dt": 1_720_010_800, "main": {"temp": 75.0, "feels_like": 76.0}, "weather": [{"main": "Clouds"}]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let points = client(&server).forecast(40.75, -73.99).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].conditions, "clouds");
    }

    #[tokio::test]
    async fn test_failed_forecast_leaves_reading_usable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let reading = client(&server).reading_with_forecast("10001").await.unwrap();
        assert_eq!(reading.temperature, 71.2);
        assert!(reading.forecast.is_empty());
    }

    #[tokio::test]
    async fn test_missing_coordinates_skip_forecast() {
        let server = MockServer::start().await;
        let mut body = current_body();
        body.as_object_mut().unwrap().remove("coord");
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [
                    {"dt": 1_720_010_800, "main": {"temp": 75.0}, "weather": [{"main": "Clouds"}]}
                ]
            })))
            .expect(0)
            .mount(&server)
            .await;

        let reading = client(&server).reading_with_forecast("10001").await.unwrap();
        assert_eq!(reading.coordinates, None);
        assert!(reading.forecast.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_on_current_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).reading_with_forecast("10001").await.unwrap_err();
        assert!(matches!(err, DadWearError::Api { .. }));
    }
}
