//! Configuration management for the `DadWear` application
//!
//! Handles loading configuration from an optional TOML file, environment
//! variables and a handful of legacy variable names, and validates the result.

use crate::DadWearError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `DadWear` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DadWearConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Weather provider configuration
    pub weather: WeatherConfig,
    /// LLM endpoint configuration
    pub llm: LlmConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// ZIP code prefilled in the form
    pub default_zip: String,
    /// IANA time zone used for time-of-day tags and chart labels
    pub display_timezone: String,
    /// Directory served under `/static`
    pub static_dir: String,
}

/// Weather provider (OpenWeatherMap) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Number of 3-hour forecast points requested
    pub forecast_points: u32,
}

/// Which chat API dialect the LLM endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackendKind {
    /// Local model server (`/api/chat`, `/api/tags`)
    Ollama,
    /// OpenAI-compatible chat completions (`/chat/completions`, `/models`)
    OpenAi,
}

/// LLM endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Master switch; when false every request takes the rule-based path
    pub enabled: bool,
    pub backend: LlmBackendKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Chat request timeout in seconds
    pub timeout_seconds: u32,
    /// Health probe timeout in seconds
    pub health_timeout_seconds: u32,
    /// Health probe attempts per check
    pub health_attempts: u32,
    /// Fixed delay between health probe attempts
    pub health_retry_delay_ms: u64,
    /// Interval of the background availability refresh
    pub recheck_interval_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_zip() -> String {
    "10001".to_string()
}

fn default_display_timezone() -> String {
    "America/New_York".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_forecast_points() -> u32 {
    40
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "mistral".to_string()
}

fn default_llm_timeout() -> u32 {
    30
}

fn default_health_timeout() -> u32 {
    2
}

fn default_health_attempts() -> u32 {
    3
}

fn default_health_retry_delay_ms() -> u64 {
    1000
}

fn default_recheck_interval() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_zip: default_zip(),
            display_timezone: default_display_timezone(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            forecast_points: default_forecast_points(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: LlmBackendKind::Ollama,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_seconds: default_llm_timeout(),
            health_timeout_seconds: default_health_timeout(),
            health_attempts: default_health_attempts(),
            health_retry_delay_ms: default_health_retry_delay_ms(),
            recheck_interval_seconds: default_recheck_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_seconds.into())
    }
}

/// Unprefixed variable names kept for existing `.env` files
const ENV_ALIASES: &[(&str, &str)] = &[
    ("OPENWEATHER_API_KEY", "weather.api_key"),
    ("OLLAMA_HOST", "llm.base_url"),
    ("OLLAMA_MODEL", "llm.model"),
    ("LLM_API_KEY", "llm.api_key"),
    ("DEFAULT_ZIP_CODE", "server.default_zip"),
    ("PORT", "server.port"),
];

impl DadWearConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var("DADWEAR_CONFIG").ok().map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("dadwear.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides with DADWEAR_ prefix, e.g. DADWEAR_LLM__MODEL
        builder = builder.add_source(
            Environment::with_prefix("DADWEAR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DadWearConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        let vars: HashMap<String, String> = std::env::vars().collect();
        config.apply_env_aliases(&vars)?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply the legacy unprefixed variables; set values win over the file
    pub fn apply_env_aliases(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        for (name, key) in ENV_ALIASES {
            let Some(value) = vars.get(*name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
                continue;
            };
            match *key {
                "weather.api_key" => self.weather.api_key = Some(value.to_string()),
                "llm.base_url" => self.llm.base_url = value.to_string(),
                "llm.model" => self.llm.model = value.to_string(),
                "llm.api_key" => self.llm.api_key = Some(value.to_string()),
                "server.default_zip" => self.server.default_zip = value.to_string(),
                "server.port" => {
                    self.server.port = value
                        .parse()
                        .with_context(|| format!("{name} must be a port number, got '{value}'"))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.default_zip.is_empty() {
            self.server.default_zip = default_zip();
        }
        if self.server.display_timezone.is_empty() {
            self.server.display_timezone = default_display_timezone();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.forecast_points == 0 {
            self.weather.forecast_points = default_forecast_points();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.llm.health_timeout_seconds == 0 {
            self.llm.health_timeout_seconds = default_health_timeout();
        }
        if self.llm.health_attempts == 0 {
            self.llm.health_attempts = default_health_attempts();
        }
        if self.llm.recheck_interval_seconds == 0 {
            self.llm.recheck_interval_seconds = default_recheck_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 60 {
            return Err(DadWearError::config("Weather API timeout cannot exceed 60 seconds").into());
        }

        if self.weather.forecast_points > 40 {
            return Err(DadWearError::config(
                "Forecast points cannot exceed 40 (five days of 3-hour steps)",
            )
            .into());
        }

        if self.llm.timeout_seconds > 300 {
            return Err(DadWearError::config("LLM timeout cannot exceed 300 seconds").into());
        }

        if self.llm.health_attempts > 10 {
            return Err(DadWearError::config("LLM health attempts cannot exceed 10").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DadWearError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DadWearError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API base URL", &self.weather.base_url),
            ("LLM base URL", &self.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DadWearError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.server.display_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(DadWearError::config(format!(
                "Unknown display time zone '{}'",
                self.server.display_timezone
            ))
            .into());
        }

        Ok(())
    }

    /// Display time zone; validated on load, falls back to US Eastern
    #[must_use]
    pub fn display_timezone(&self) -> chrono_tz::Tz {
        self.server
            .display_timezone
            .parse()
            .unwrap_or(chrono_tz::America::New_York)
    }
}
