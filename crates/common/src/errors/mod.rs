//! Error types for votewatch
//!
//! Provides:
//! - Distinct error types for the failure modes of a fetch/normalize run
//! - Machine-readable error codes
//! - Transient vs. terminal classification used by the retry layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Record errors (1xxx)
    MalformedRecord,
    MissingField,

    // Resource errors (4xxx)
    NotFound,
    DivisionNotFound,

    // Snapshot errors (7xxx)
    SnapshotIo,

    // External service errors (8xxx)
    UpstreamStatus,
    UpstreamConnection,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::MalformedRecord => 1001,
            ErrorCode::MissingField => 1002,

            ErrorCode::NotFound => 4001,
            ErrorCode::DivisionNotFound => 4002,

            ErrorCode::SnapshotIo => 7001,

            ErrorCode::UpstreamStatus => 8001,
            ErrorCode::UpstreamConnection => 8002,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Record errors
    #[error("Malformed {record} record: {message}")]
    MalformedRecord { record: String, message: String },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Division not found: {id}")]
    DivisionNotFound { id: u64 },

    // Snapshot errors
    #[error("Snapshot IO error for {path}: {message}")]
    SnapshotIo { path: String, message: String },

    // External service errors
    #[error("Upstream returned {status} for {url}")]
    Upstream { status: u16, url: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::DivisionNotFound { .. } => ErrorCode::DivisionNotFound,
            AppError::SnapshotIo { .. } => ErrorCode::SnapshotIo,
            AppError::Upstream { .. } => ErrorCode::UpstreamStatus,
            AppError::HttpClient(_) => ErrorCode::UpstreamConnection,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Only connection-level failures qualify. A non-2xx status is terminal
    /// for the item that produced it.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::HttpClient(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// HTTP status carried by an upstream failure, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Upstream { status, .. } => Some(*status),
            AppError::HttpClient(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Shorthand for a snapshot IO failure on `path`
    pub fn snapshot_io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        AppError::SnapshotIo {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
