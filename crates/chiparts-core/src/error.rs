//! Error types for ChiParts

use thiserror::Error;

/// Result type alias using ChiParts' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ChiParts operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required order field is missing or empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// No destination accepted the notification
    #[error("Delivery failed: none of {attempted} destinations accepted the message")]
    Delivery { attempted: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration source error
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    /// Outbound HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
