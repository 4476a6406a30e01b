//! Error types and handling for the `DadWear` application

use thiserror::Error;

/// Main error type for the `DadWear` application
#[derive(Error, Debug)]
pub enum DadWearError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream service errors (weather provider, LLM endpoint)
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl DadWearError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DadWearError::Config { .. } => {
                "The app is misconfigured. Please check the weather API key.".to_string()
            }
            DadWearError::Api { .. } => {
                "We couldn't reach the weather service right now. Please try again in a minute."
                    .to_string()
            }
            DadWearError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}

impl From<reqwest::Error> for DadWearError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DadWearError::api(format!("request timed out: {err}"))
        } else {
            DadWearError::api(err.to_string())
        }
    }
}
