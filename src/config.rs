//! Configuration management for the body logging middleware
//!
//! Loads the middleware's own toggles from environment variables with
//! fail-soft behavior. Configuration of the `tracing` subscriber itself
//! belongs to the host application (see [`crate::telemetry`]).

use std::sync::Arc;

use crate::error::LogError;

const ENV_CAPTURE_BODIES: &str = "BODYLOG_CAPTURE_BODIES";
const ENV_COMPLETION_SUMMARY: &str = "BODYLOG_COMPLETION_SUMMARY";
const ENV_MAX_BODY_SIZE: &str = "BODYLOG_MAX_BODY_SIZE";
const ENV_REDACT_HEADERS: &str = "BODYLOG_REDACT_HEADERS";

/// Configuration for the body logging middleware
///
/// Loaded from environment variables:
/// - `BODYLOG_CAPTURE_BODIES`: emit the request/response body events (default `true`)
/// - `BODYLOG_COMPLETION_SUMMARY`: emit one summary event per request (default `true`)
/// - `BODYLOG_MAX_BODY_SIZE`: cap on bytes captured per body for logging (default: unbounded)
/// - `BODYLOG_REDACT_HEADERS`: mask credential headers in logged header maps (default `false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether the interceptor captures bodies and emits its two events
    pub capture_bodies: bool,

    /// Whether a single completion event (method, path, status, elapsed) is emitted
    pub completion_summary: bool,

    /// Upper bound on bytes buffered for logging per body. Handlers and
    /// clients always see the full body regardless of this limit.
    pub max_body_size: Option<usize>,

    /// Whether sensitive header values are masked before logging
    pub redact_headers: bool,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unparsable values are reported through `tracing` and replaced by their
    /// defaults, so a bad variable never prevents the host from starting.
    /// Use [`Config::try_from_env`] to reject them instead.
    pub fn from_env() -> Self {
        let defaults = Self::new();
        let capture_bodies = read_flag(ENV_CAPTURE_BODIES).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default");
            Some(defaults.capture_bodies)
        });
        let completion_summary = read_flag(ENV_COMPLETION_SUMMARY).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default");
            Some(defaults.completion_summary)
        });
        let max_body_size = read_size(ENV_MAX_BODY_SIZE).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default");
            defaults.max_body_size
        });
        let redact_headers = read_flag(ENV_REDACT_HEADERS).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default");
            Some(defaults.redact_headers)
        });

        let config = Self {
            capture_bodies: capture_bodies.unwrap_or(defaults.capture_bodies),
            completion_summary: completion_summary.unwrap_or(defaults.completion_summary),
            max_body_size,
            redact_headers: redact_headers.unwrap_or(defaults.redact_headers),
        };

        if !config.capture_bodies && !config.completion_summary {
            tracing::warn!("body logging middleware loaded with every event disabled");
        }
        config
    }

    /// Load configuration from environment variables, rejecting bad values
    pub fn try_from_env() -> Result<Self, LogError> {
        let defaults = Self::new();
        Ok(Self {
            capture_bodies: read_flag(ENV_CAPTURE_BODIES)?.unwrap_or(defaults.capture_bodies),
            completion_summary: read_flag(ENV_COMPLETION_SUMMARY)?
                .unwrap_or(defaults.completion_summary),
            max_body_size: read_size(ENV_MAX_BODY_SIZE)?,
            redact_headers: read_flag(ENV_REDACT_HEADERS)?.unwrap_or(defaults.redact_headers),
        })
    }

    /// Default configuration: both event kinds on, unbounded capture, no redaction
    pub fn new() -> Self {
        Self {
            capture_bodies: true,
            completion_summary: true,
            max_body_size: None,
            redact_headers: false,
        }
    }

    pub fn with_capture_bodies(mut self, enabled: bool) -> Self {
        self.capture_bodies = enabled;
        self
    }

    pub fn with_completion_summary(mut self, enabled: bool) -> Self {
        self.completion_summary = enabled;
        self
    }

    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = Some(limit);
        self
    }

    pub fn with_redact_headers(mut self, enabled: bool) -> Self {
        self.redact_headers = enabled;
        self
    }

    /// Wrap config in Arc for thread-safe sharing
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn read_flag(key: &'static str) -> Result<Option<bool>, LogError> {
    match std::env::var(key) {
        Ok(val) => parse_flag(&val)
            .map(Some)
            .ok_or_else(|| LogError::invalid_config(key, format!("expected a boolean, got {val:?}"))),
        Err(_) => Ok(None),
    }
}

fn read_size(key: &'static str) -> Result<Option<usize>, LogError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| LogError::invalid_config(key, e.to_string())),
        Err(_) => Ok(None),
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();

        assert!(config.capture_bodies);
        assert!(config.completion_summary);
        assert_eq!(config.max_body_size, None);
        assert!(!config.redact_headers);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_builders() {
        let config = Config::new()
            .with_capture_bodies(false)
            .with_completion_summary(false)
            .with_max_body_size(64)
            .with_redact_headers(true);

        assert!(!config.capture_bodies);
        assert!(!config.completion_summary);
        assert_eq!(config.max_body_size, Some(64));
        assert!(config.redact_headers);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_config_into_arc() {
        let arc_config = Config::new().with_max_body_size(10).into_arc();
        assert_eq!(arc_config.max_body_size, Some(10));
    }

    // Environment variables are process-wide, so every env-driven case lives in
    // one test to keep them from racing each other.
    #[test]
    fn test_config_from_env() {
        std::env::set_var(ENV_CAPTURE_BODIES, "false");
        std::env::set_var(ENV_MAX_BODY_SIZE, "2048");
        std::env::set_var(ENV_REDACT_HEADERS, "yes");
        let config = Config::try_from_env().unwrap();
        assert!(!config.capture_bodies);
        assert!(config.completion_summary);
        assert_eq!(config.max_body_size, Some(2048));
        assert!(config.redact_headers);

        std::env::set_var(ENV_MAX_BODY_SIZE, "lots");
        let err = Config::try_from_env().unwrap_err();
        assert!(matches!(
            err,
            LogError::InvalidConfig {
                key: ENV_MAX_BODY_SIZE,
                ..
            }
        ));

        // fail-soft loader keeps the good values and drops the bad one
        let config = Config::from_env();
        assert!(!config.capture_bodies);
        assert_eq!(config.max_body_size, None);

        std::env::remove_var(ENV_CAPTURE_BODIES);
        std::env::remove_var(ENV_MAX_BODY_SIZE);
        std::env::remove_var(ENV_REDACT_HEADERS);
        assert_eq!(Config::try_from_env().unwrap(), Config::new());
    }
}
