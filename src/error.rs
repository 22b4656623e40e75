//! Error types for Mathmate.

use thiserror::Error;

/// Library-level error type for Mathmate operations.
#[derive(Error, Debug)]
pub enum MathmateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No API key provided for the model service")]
    MissingCredential,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model API error: {0}")]
    Model(String),

    #[error("Tool '{name}' failed: {message}")]
    Tool { name: String, message: String },

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl MathmateError {
    /// Build a tool failure for the named tool.
    pub fn tool(name: &str, message: impl Into<String>) -> Self {
        MathmateError::Tool {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for Mathmate operations.
pub type Result<T> = std::result::Result<T, MathmateError>;
