//! Plotdoc entry point.
//!
//! Opens one property, resolves the documents of every unit, and prints one
//! line per unit.

use plotdoc_client::api_client::RestClient;
use plotdoc_client::cli::Invocation;
use plotdoc_client::config::PlotdocConfig;
use plotdoc_client::error::ClientError;
use plotdoc_client::{report, telemetry};
use plotdoc_resolve::{Collaborators, Workspace};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let invocation = Invocation::parse(std::env::args().skip(1))?;
    let config = PlotdocConfig::load(invocation.config_path.as_deref())?;
    telemetry::init(&config.logging)?;

    let client = Arc::new(RestClient::new(&config)?);
    let collaborators = Collaborators {
        documents: client.clone(),
        units: client.clone(),
        categories: client,
    };
    let mut workspace = Workspace::new(collaborators, config.session_config());
    let session = workspace.open_property(invocation.property_id).await;
    let load = session.load_all().await;

    for line in report::lines(session.catalog(), &load) {
        println!("{}", line);
    }

    tracing::info!(
        property_id = %invocation.property_id,
        units = session.catalog().len(),
        failed = load.failed.len(),
        degraded_sources = ?session.catalog().degraded_sources(),
        "Report complete"
    );
    Ok(())
}
