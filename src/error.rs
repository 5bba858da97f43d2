//! Error types for the body logging middleware
//!
//! None of these errors ever reach the client. Sink failures are caught in
//! [`crate::logger::forward_log`] and reported through `tracing`; configuration
//! errors surface before the server starts accepting requests.

use thiserror::Error;

/// Main error type for body logging operations
#[derive(Error, Debug)]
pub enum LogError {
    /// A configuration value was present but could not be used
    #[error("Invalid configuration: {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    /// The log sink refused or failed to record an event
    #[error("Log sink failed: {0}")]
    Sink(String),

    /// JSON serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error for unexpected failures
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl LogError {
    /// Create a generic error from any error type
    pub fn from_string(msg: impl Into<String>) -> Self {
        LogError::Other(msg.into())
    }

    pub(crate) fn invalid_config(key: &'static str, reason: impl Into<String>) -> Self {
        LogError::InvalidConfig {
            key,
            reason: reason.into(),
        }
    }
}
