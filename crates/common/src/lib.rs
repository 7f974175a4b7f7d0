//! votewatch Common Library
//!
//! Shared code for the votewatch ingestion tools:
//! - Division and member models as served by the voting-records API
//! - Remote API client abstraction
//! - Local JSON snapshot store
//! - Member normalization, vote tables and division categorization
//! - Error types, diagnostics and configuration
//! - Metrics

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod parliament;
pub mod store;

// Re-export commonly used types
pub use client::DivisionSource;
pub use config::AppConfig;
pub use diagnostics::{BatchOutcome, Diagnostic, DiagnosticKind};
pub use errors::{AppError, Result};
pub use store::SnapshotStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default voting-records API endpoint
pub const DEFAULT_API_BASE: &str = "https://theyvoteforyou.org.au/api/v1";

/// Default directory for local snapshots
pub const DEFAULT_DATA_DIR: &str = "./data/parliament";
