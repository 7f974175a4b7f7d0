//! Per-item outcomes for best-effort batches
//!
//! Fetching, normalizing and joining all skip bad items instead of aborting.
//! A `BatchOutcome` carries the items that made it through together with a
//! `Diagnostic` for every item that did not (or that needs manual review).

use serde::{Deserialize, Serialize};
use std::fmt;

/// What went wrong with a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Remote call failed; `status` is absent for connection errors
    FetchFailed { status: Option<u16> },
    /// Record lacked a required field or could not be decoded
    Malformed,
    /// Vote record had no roster row to land in
    UnmatchedVote,
    /// Vote record was joined on the name+party key instead of the person id
    FallbackMatch,
    /// Member has no chamber and cannot be filed into a roster
    MissingChamber,
    /// Supplementary member stats could not be fetched; the member is kept
    StatsUnavailable { status: Option<u16> },
}

/// A skipped or suspicious item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Human-readable subject, e.g. `division 6712` or `Jane Doe (Greens)`
    pub subject: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(subject: impl Into<String>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            kind,
            message: message.into(),
        }
    }

    /// Build a fetch failure from the error that caused it
    pub fn fetch_failed(subject: impl Into<String>, err: &crate::AppError) -> Self {
        Self::new(
            subject,
            DiagnosticKind::FetchFailed { status: err.upstream_status() },
            err.to_string(),
        )
    }

    /// Stats fetch failure for a member that is still kept
    pub fn stats_unavailable(subject: impl Into<String>, err: &crate::AppError) -> Self {
        Self::new(
            subject,
            DiagnosticKind::StatsUnavailable { status: err.upstream_status() },
            err.to_string(),
        )
    }

    /// True for diagnostics that mean the item was dropped
    pub fn is_skip(&self) -> bool {
        !matches!(
            self.kind,
            DiagnosticKind::FallbackMatch | DiagnosticKind::StatsUnavailable { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Successful items plus the diagnostics collected along the way
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            subject = %diagnostic.subject,
            kind = ?diagnostic.kind,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    /// Number of items dropped from the batch
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }

    /// Diagnostics of one kind, for assertions and reports
    pub fn diagnostics_of<'a>(
        &'a self,
        pred: impl Fn(&DiagnosticKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| pred(&d.kind))
    }

}
