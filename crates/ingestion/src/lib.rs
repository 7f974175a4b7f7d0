//! votewatch ingestion
//!
//! Run-once tools that mirror the voting-records API into local snapshots
//! and derive reports from them.

pub mod errors;
pub mod pipeline;
pub mod report;
pub mod telemetry;

pub use errors::IngestionError;
pub use pipeline::{IngestionPipeline, RunSummary};
pub use report::{build_network, division_report, division_report_by_name, roster_summary, DivisionReport, TierTally};
