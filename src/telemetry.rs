//! Recommended `tracing` subscriber setup for hosts
//!
//! The middleware only emits events; installing a subscriber is up to the
//! application. Hosts without their own setup can call [`init_subscriber`].
//! JSON output includes the current span, which is where `UserName` and
//! `RequestId` live.

use tracing_subscriber::EnvFilter;

use crate::error::LogError;

/// Output format for [`init_subscriber`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, span fields included
    #[default]
    Json,
    /// Human-readable, for local development
    Pretty,
}

/// Install a global subscriber honoring `RUST_LOG`, falling back to `default_filter`
///
/// Fails if a global subscriber is already installed or the fallback filter
/// does not parse.
pub fn init_subscriber(default_filter: &str, format: LogFormat) -> Result<(), LogError> {
    let filter = env_filter(default_filter)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.with_target(false).try_init(),
    };
    installed.map_err(|e| LogError::from_string(e.to_string()))
}

fn env_filter(default_filter: &str) -> Result<EnvFilter, LogError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| LogError::invalid_config("RUST_LOG", e.to_string())),
    }
}
