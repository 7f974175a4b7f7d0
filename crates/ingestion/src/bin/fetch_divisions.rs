//! fetch-divisions
//!
//! Mirrors the most recent divisions into `divisions.json`:
//! 1. Loads configuration (API key from `TVFY_API_KEY` or `APP__API__KEY`)
//! 2. Fetches the division list
//! 3. Fetches details for divisions not stored yet
//! 4. Merges them into the snapshot

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
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.observability);
    register_metrics();

    info!("Starting {} fetch-divisions v{}", config.observability.service_name, VERSION);

    let client = TvfyClient::from_config(&config).map_err(|e| {
        error!(error = %e, "Cannot create API client");
        e
    })?;
    let store = JsonFileStore::new(&config.storage.data_dir);
    info!(data_dir = %store.data_dir().display(), "Using snapshot directory");

    let pipeline = IngestionPipeline::new(Arc::new(client), Arc::new(store));
    let summary = pipeline.ingest_divisions().await.map_err(|e| {
        error!(error = %e, "Division ingestion failed");
        e
    })?;

    for diagnostic in &summary.diagnostics {
        info!(%diagnostic, "Skipped");
    }
    info!(
        listed = summary.listed,
        inserted = summary.inserted.len(),
        skipped = summary.skipped(),
        "Done"
    );
    Ok(())
}
