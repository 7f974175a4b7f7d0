//! division-report
//!
//! Reads the local snapshots and prints JSON to stdout:
//! - `division-report <id>`: category, vote table and party tally
//! - `division-report name <division name>`: the same, looked up by name
//! - `division-report network <house>`: builds and saves the co-vote matrix
//! - `division-report roster`: stored members per chamber and party

use tracing::error;
use votewatch_common::config::AppConfig;
use votewatch_common::models::House;
use votewatch_common::store::JsonFileStore;
use votewatch_ingestion::{
    build_network, division_report, division_report_by_name, roster_summary, telemetry, IngestionError,
};

const USAGE: &str = "usage: division-report <id> | name <division name> | network <house> | roster";

fn run(store: &JsonFileStore, args: &[String]) -> Result<String, IngestionError> {
    let json = match args {
        [mode, house] if mode == "network" => {
            let house: House = house.parse()?;
            serde_json::to_string_pretty(&build_network(store, house)?)
        }
        [mode, name @ ..] if mode == "name" && !name.is_empty() => {
            serde_json::to_string_pretty(&division_report_by_name(store, &name.join(" "))?)
        }
        [mode] if mode == "roster" => serde_json::to_string_pretty(&roster_summary(store)?),
        [id] => {
            let id: u64 = id
                .parse()
                .map_err(|_| IngestionError::Usage(format!("not a division id: {}", id)))?;
            serde_json::to_string_pretty(&division_report(store, id)?)
        }
        _ => return Err(IngestionError::Usage(USAGE.to_string())),
    };
    json.map_err(|e| IngestionError::Common(e.into()))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    telemetry::init_tracing(&config.observability);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let store = JsonFileStore::new(&config.storage.data_dir);

    let output = run(&store, &args).map_err(|e| {
        error!(error = %e, "Report failed");
        e
    })?;
    println!("{}", output);
    Ok(())
}
