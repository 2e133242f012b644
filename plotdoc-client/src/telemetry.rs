//! Tracing subscriber initialisation.

use crate::config::LoggingConfig;
use crate::error::ClientError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG`, or from the configured directives when it is unset.
pub fn env_filter(logging: &LoggingConfig) -> Result<EnvFilter, ClientError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&logging.filter)
            .map_err(|e| ClientError::Telemetry(format!("invalid filter '{}': {}", logging.filter, e))),
    }
}

/// Install the global subscriber. Output goes to stderr so that stdout
/// carries only the report.
pub fn init(logging: &LoggingConfig) -> Result<(), ClientError> {
    let registry = tracing_subscriber::registry().with(env_filter(logging)?);
    let result = if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| ClientError::Telemetry(e.to_string()))?;

    tracing::debug!(json = logging.json, "Logging initialized");
    Ok(())
}
