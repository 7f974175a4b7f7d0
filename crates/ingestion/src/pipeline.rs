//! Ingestion pipeline
//!
//! Mirrors remote divisions and members into the local snapshots:
//! 1. Fetches the list page
//! 2. Fetches details only for ids not stored yet
//! 3. Normalizes members and files them by chamber
//! 4. Merges new records into the snapshot (stored records are never replaced)
//!
//! Per-item failures become diagnostics; only a failed list call or an
//! unwritable snapshot aborts a run.

use crate::errors::IngestionError;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use votewatch_common::diagnostics::{BatchOutcome, Diagnostic, DiagnosticKind};
use votewatch_common::metrics;
use votewatch_common::models::{Division, RawMember};
use votewatch_common::parliament::MemberNormalizer;
use votewatch_common::{DivisionSource, SnapshotStore};

/// What one ingestion run did
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Records on the remote list page
    pub listed: usize,
    /// Listed records that were already stored and not fetched again
    pub already_stored: usize,
    /// Ids newly written to the snapshot
    pub inserted: Vec<u64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunSummary {
    /// Records dropped from this run
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_skip()).count()
    }
}

/// Fetch-and-merge pipeline over an injected source and store
pub struct IngestionPipeline {
    source: Arc<dyn DivisionSource>,
    store: Arc<dyn SnapshotStore>,
    normalizer: MemberNormalizer,
}

impl IngestionPipeline {
    pub fn new(source: Arc<dyn DivisionSource>, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            source,
            store,
            normalizer: MemberNormalizer::default(),
        }
    }

    /// Add recent divisions that are not in the snapshot yet
    #[instrument(skip(self))]
    pub async fn ingest_divisions(&self) -> Result<RunSummary, IngestionError> {
        let listed = self
            .source
            .fetch_recent_divisions()
            .await
            .map_err(IngestionError::ListUnavailable)?;

        let stored = self.store.load_divisions().map_err(IngestionError::Snapshot)?;
        info!(listed = listed.len(), stored = stored.len(), "Division list fetched");

        let mut summary = RunSummary {
            listed: listed.len(),
            ..RunSummary::default()
        };
        let mut batch: BatchOutcome<Division> = BatchOutcome::new();
        let mut seen = HashSet::new();

        for entry in &listed {
            if stored.contains_key(&entry.id) || !seen.insert(entry.id) {
                debug!(id = entry.id, "Division already stored");
                summary.already_stored += 1;
                continue;
            }

            match self.source.fetch_division_detail(entry.id).await {
                Ok(division) => batch.push(division),
                Err(e) => batch.report(Diagnostic::fetch_failed(format!("division {}", entry.id), &e)),
            }
        }

        let report = self
            .store
            .merge_divisions(batch.items)
            .map_err(IngestionError::Snapshot)?;

        summary.inserted = report.inserted;
        summary.diagnostics = batch.diagnostics;
        metrics::record_merge("divisions", summary.inserted.len(), summary.skipped());

        info!(
            inserted = summary.inserted.len(),
            already_stored = summary.already_stored,
            skipped = summary.skipped(),
            "Division ingestion complete"
        );
        Ok(summary)
    }

    /// Add people who are not in either chamber roster yet
    #[instrument(skip(self))]
    pub async fn ingest_members(&self) -> Result<RunSummary, IngestionError> {
        let people = self
            .source
            .fetch_members()
            .await
            .map_err(IngestionError::RosterUnavailable)?;

        let stored: HashSet<u64> = self
            .store
            .load_all_members()
            .map_err(IngestionError::Snapshot)?
            .into_iter()
            .filter_map(|m| m.id)
            .collect();
        info!(listed = people.len(), stored = stored.len(), "Member list fetched");

        let mut summary = RunSummary {
            listed: people.len(),
            ..RunSummary::default()
        };
        let mut fetched: BatchOutcome<RawMember> = BatchOutcome::new();
        let mut seen = HashSet::new();

        for person in people {
            let Some(id) = person.id else {
                fetched.report(Diagnostic::new(
                    person.name.clone().unwrap_or_else(|| "unnamed person".to_string()),
                    DiagnosticKind::Malformed,
                    "person record has no id",
                ));
                continue;
            };
            if stored.contains(&id) || !seen.insert(id) {
                summary.already_stored += 1;
                continue;
            }

            // Stats are supplementary: a failed detail call keeps the person
            let additional_info = match self.source.fetch_member_detail(id).await {
                Ok(detail) => Some(detail),
                Err(e) => {
                    fetched.report(Diagnostic::stats_unavailable(format!("person {}", id), &e));
                    None
                }
            };
            fetched.push(RawMember {
                additional_info,
                ..person
            });
        }

        let normalized = self.normalizer.normalize_all(&fetched.items);
        let report = self
            .store
            .merge_members(normalized.items)
            .map_err(IngestionError::Snapshot)?;

        for diagnostic in &report.diagnostics {
            tracing::warn!(subject = %diagnostic.subject, kind = ?diagnostic.kind, "{}", diagnostic.message);
        }

        summary.inserted = report
            .chambers
            .values()
            .flat_map(|r| r.inserted.iter().copied())
            .collect();
        summary.inserted.sort_unstable();
        summary.diagnostics = fetched
            .diagnostics
            .into_iter()
            .chain(normalized.diagnostics)
            .chain(report.diagnostics)
            .collect();
        metrics::record_merge("members", summary.inserted.len(), summary.skipped());

        info!(
            inserted = summary.inserted.len(),
            already_stored = summary.already_stored,
            skipped = summary.skipped(),
            "Member ingestion complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use votewatch_common::client::InMemorySource;
    use votewatch_common::models::{AdditionalInfo, House};
    use votewatch_common::store::{JsonFileStore, MemoryStore};

    fn division(id: u64, name: &str) -> Division {
        serde_json::from_value(json!({
            "id": id,
            "house": "senate",
            "name": name,
            "date": "2024-08-15",
            "number": id,
            "votes": [
                { "member": { "person": { "id": 1 }, "first_name": "Jane", "last_name": "Doe", "party": "Australian Greens" }, "vote": "aye" }
            ]
        }))
        .unwrap()
    }

    fn person(id: u64, first: &str, last: &str, house: &str, party: &str) -> RawMember {
        serde_json::from_value(json!({
            "id": id,
            "latest_member": {
                "id": id + 100,
                "name": { "first": first, "last": last },
                "electorate": "Tasmania",
                "house": house,
                "party": party
            }
        }))
        .unwrap()
    }

    fn stats(rebellions: u32) -> AdditionalInfo {
        AdditionalInfo {
            rebellions: Some(rebellions),
            votes_attended: Some(100),
            votes_possible: Some(120),
            offices: vec![],
        }
    }

    #[tokio::test]
    async fn test_rerun_fetches_no_stored_details() {
        let source = Arc::new(
            InMemorySource::new()
                .with_division(division(1, "Motions - One"))
                .with_division(division(2, "Motions - Two")),
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(source.clone(), store.clone());

        let first = pipeline.ingest_divisions().await.unwrap();
        assert_eq!(first.inserted, vec![1, 2]);

        let second = pipeline.ingest_divisions().await.unwrap();
        assert!(second.inserted.is_empty());
        assert_eq!(second.already_stored, 2);

        let detail_calls = source
            .calls()
            .into_iter()
            .filter(|path| path.starts_with("divisions/"))
            .count();
        assert_eq!(detail_calls, 2);
    }

    #[tokio::test]
    async fn test_failed_detail_is_skipped() {
        let source = Arc::new(
            InMemorySource::new()
                .with_division(division(1, "Motions - One"))
                .with_division(division(2, "Motions - Two"))
                .with_division(division(3, "Motions - Three"))
                .failing("divisions/2.json"),
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(source, store.clone());

        let summary = pipeline.ingest_divisions().await.unwrap();
        assert_eq!(summary.inserted, vec![1, 3]);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(
            summary.diagnostics[0].kind,
            DiagnosticKind::FetchFailed { status: Some(500) }
        );
        assert_eq!(store.load_divisions().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_list_is_fatal() {
        let source = Arc::new(InMemorySource::new().failing("divisions.json"));
        let pipeline = IngestionPipeline::new(source, Arc::new(MemoryStore::new()));

        let err = pipeline.ingest_divisions().await.unwrap_err();
        assert!(matches!(err, IngestionError::ListUnavailable(_)));
    }

    #[tokio::test]
    async fn test_divisions_written_to_disk_are_additive() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));

        let early = Arc::new(InMemorySource::new().with_division(division(1, "Motions - One")));
        IngestionPipeline::new(early, store.clone())
            .ingest_divisions()
            .await
            .unwrap();

        let later = Arc::new(InMemorySource::new().with_division(division(2, "Motions - Two")));
        IngestionPipeline::new(later, store.clone())
            .ingest_divisions()
            .await
            .unwrap();

        let stored = store.load_divisions().unwrap();
        assert_eq!(stored.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(stored[&1].header.extra.get("number"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_members_normalized_and_split() {
        let source = Arc::new(
            InMemorySource::new()
                .with_person(person(1, "Jane", "Doe", "senate", "Australian Greens"), Some(stats(2)))
                .with_person(
                    person(2, "John", "Roe", "representatives", "Liberal Party"),
                    Some(stats(0)),
                )
                .with_person(person(3, "Lost", "Detail", "senate", "Independent"), None),
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(source.clone(), store.clone());

        let summary = pipeline.ingest_members().await.unwrap();
        assert_eq!(summary.inserted, vec![1, 2, 3]);
        assert_eq!(summary.skipped(), 0);

        let senate = store.load_roster(House::Senate).unwrap();
        assert_eq!(senate[&1].rebellions, Some(2));
        assert_eq!(senate[&1].member_id, Some(101));

        // No detail record: kept without stats
        assert_eq!(senate[&3].rebellions, None);
        assert_eq!(senate[&3].effective_party, "Lost Detail");

        let house = store.load_roster(House::Representatives).unwrap();
        assert_eq!(house[&2].effective_party, "Liberal National Party");

        // Stored people are not fetched again
        pipeline.ingest_members().await.unwrap();
        let detail_calls = source
            .calls()
            .into_iter()
            .filter(|path| path == "people/1.json")
            .count();
        assert_eq!(detail_calls, 1);
    }

    #[tokio::test]
    async fn test_failed_stats_keep_member_in_roster() {
        let source = Arc::new(
            InMemorySource::new()
                .with_person(person(7, "Lidia", "Thorpe", "senate", "Independent"), Some(stats(1)))
                .failing("people/7.json"),
        );
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestionPipeline::new(source, store.clone());

        let summary = pipeline.ingest_members().await.unwrap();
        assert_eq!(summary.inserted, vec![7]);
        assert_eq!(summary.skipped(), 0);
        assert_eq!(
            summary.diagnostics[0].kind,
            DiagnosticKind::StatsUnavailable { status: Some(500) }
        );

        let senate = store.load_roster(House::Senate).unwrap();
        assert_eq!(senate[&7].rebellions, None);
        assert_eq!(senate[&7].votes_attended, None);
        assert_eq!(senate[&7].effective_party, "Lidia Thorpe");
    }
}
