//! Error types for the Gemini gateway.

use thiserror::Error;

/// Errors that can occur when talking to the Gemini AI API.
#[derive(Debug, Error)]
pub enum GoogleGenerativeAIError {
    /// Base error for the Gemini AI client.
    #[error("[GoogleGenerativeAI Error]: {message}")]
    Base {
        /// Error message
        message: String,
    },

    /// Error occurred during an API request.
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error occurred when accessing environment variables.
    #[error("Environment variable not found: {0}")]
    EnvError(#[from] std::env::VarError),

    /// Error occurred when parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GoogleGenerativeAIError {
    /// Creates a new Base error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Base {
            message: message.into(),
        }
    }

    /// The message to hand back to gateway callers.
    ///
    /// For `Base` errors this is the bare message, without the client prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Base { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors raised while loading the gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Environment variable {name} must be set")]
    Missing {
        /// Name of the variable
        name: &'static str,
    },

    /// An environment variable is set but cannot be parsed.
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Name of the variable
        name: &'static str,
        /// Raw value found in the environment
        value: String,
        /// Why the value was rejected
        reason: String,
    },
}
