//! Plotdoc Client
//!
//! REST implementations of the plotdoc collaborator traits, configuration
//! loading, logging setup, and the pieces of the `plotdoc` report binary.

pub mod api_client;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod telemetry;

pub use api_client::{ApiClientError, RestClient};
pub use cli::Invocation;
pub use config::{AuthConfig, ConfigError, LoggingConfig, PlotdocConfig};
pub use error::ClientError;
pub use report::ReportLine;
