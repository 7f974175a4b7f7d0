//! Ingestion error types

use thiserror::Error;
use votewatch_common::errors::AppError;
use votewatch_common::models::House;

#[derive(Error, Debug)]
pub enum IngestionError {
    /// The division list could not be fetched; nothing to ingest
    #[error("Division list unavailable: {0}")]
    ListUnavailable(#[source] AppError),

    /// The member list could not be fetched; nothing to ingest
    #[error("Member list unavailable: {0}")]
    RosterUnavailable(#[source] AppError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[source] AppError),

    #[error("No members stored for the {0} chamber")]
    EmptyRoster(House),

    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error(transparent)]
    Common(#[from] AppError),
}

impl IngestionError {
    /// Error code of the underlying common error, if any
    pub fn code(&self) -> Option<votewatch_common::errors::ErrorCode> {
        match self {
            IngestionError::ListUnavailable(e)
            | IngestionError::RosterUnavailable(e)
            | IngestionError::Snapshot(e)
            | IngestionError::Common(e) => Some(e.code()),
            IngestionError::EmptyRoster(_) | IngestionError::Usage(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votewatch_common::errors::ErrorCode;

    #[test]
    fn test_codes_pass_through() {
        let err = IngestionError::ListUnavailable(AppError::Upstream {
            status: 503,
            url: "divisions.json".into(),
        });
        assert_eq!(err.code(), Some(ErrorCode::UpstreamStatus));
        assert!(err.to_string().contains("503"));
        assert_eq!(IngestionError::EmptyRoster(House::Senate).code(), None);
    }
}
