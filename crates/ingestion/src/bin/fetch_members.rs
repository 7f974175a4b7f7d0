//! fetch-members
//!
//! Mirrors the member roster into `house.json` and `senate.json`.
//! People already stored in either chamber are left as they are.

use std::sync::Arc;
use tracing::{error, info};
use votewatch_common::client::TvfyClient;
use votewatch_common::config::AppConfig;
use votewatch_common::metrics::register_metrics;
use votewatch_common::store::JsonFileStore;
use votewatch_common::VERSION;
use votewatch_ingestion::{telemetry, IngestionPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.observability);
    register_metrics();

    info!("Starting {} fetch-members v{}", config.observability.service_name, VERSION);

    let client = TvfyClient::from_config(&config).map_err(|e| {
        error!(error = %e, "Cannot create API client");
        e
    })?;
    let store = JsonFileStore::new(&config.storage.data_dir);

    let pipeline = IngestionPipeline::new(Arc::new(client), Arc::new(store));
    let summary = pipeline.ingest_members().await.map_err(|e| {
        error!(error = %e, "Member ingestion failed");
        e
    })?;

    info!(
        listed = summary.listed,
        already_stored = summary.already_stored,
        inserted = summary.inserted.len(),
        skipped = summary.skipped(),
        "Done"
    );
    Ok(())
}
