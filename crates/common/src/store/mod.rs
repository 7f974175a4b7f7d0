//! Local JSON snapshots
//!
//! Provides:
//! - `load` / `merge_and_save` over id-keyed JSON object files
//! - First-write-wins merging: new ids are added, stored ids are never touched
//! - The `SnapshotStore` interface with file-backed and in-memory stores
//! - Chamber roster split into `senate.json` and `house.json`
//!
//! Maps are `BTreeMap`s so the written bytes only depend on the contents,
//! which keeps repeated merges of the same data byte-identical.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::errors::{AppError, Result};
use crate::models::{Division, House, Member};
use crate::parliament::CoVoteMatrix;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// File name of the division snapshot
pub const DIVISIONS_FILE: &str = "divisions.json";

/// Which ids a merge inserted and which it left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub inserted: Vec<u64>,
    pub already_present: Vec<u64>,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        !self.inserted.is_empty()
    }
}

/// Insert every new id; ids already in `existing` keep their stored record
pub fn merge_records<V>(
    existing: &mut BTreeMap<u64, V>,
    new_records: impl IntoIterator<Item = (u64, V)>,
) -> MergeReport {
    let mut report = MergeReport::default();
    for (id, record) in new_records {
        if existing.contains_key(&id) {
            report.already_present.push(id);
        } else {
            existing.insert(id, record);
            report.inserted.push(id);
        }
    }
    report
}

/// Load an id-keyed JSON object. A missing file is an empty snapshot.
pub fn load<V: DeserializeOwned>(path: &Path) -> Result<BTreeMap<u64, V>> {
    if !path.exists() {
        debug!(path = %path.display(), "No snapshot yet");
        return Ok(BTreeMap::new());
    }
    let bytes = fs::read(path).map_err(|e| AppError::snapshot_io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::snapshot_io(path, e))
}

/// Merge `new_records` into `existing` and write the merged map to `path`
#[instrument(skip(existing, new_records), fields(path = %path.display()))]
pub fn merge_and_save<V: Serialize>(
    path: &Path,
    existing: &mut BTreeMap<u64, V>,
    new_records: impl IntoIterator<Item = (u64, V)>,
) -> Result<MergeReport> {
    let report = merge_records(existing, new_records);
    write_json(path, existing)?;
    info!(
        inserted = report.inserted.len(),
        already_present = report.already_present.len(),
        total = existing.len(),
        "Snapshot merged"
    );
    Ok(report)
}

/// Write `value` as compact JSON, replacing `path` atomically
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::snapshot_io(parent, e))?;
    }
    let bytes = serde_json::to_vec(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes).map_err(|e| AppError::snapshot_io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| AppError::snapshot_io(path, e))?;
    Ok(())
}

/// Result of filing a normalized roster into the chamber snapshots
#[derive(Debug, Clone, Default)]
pub struct RosterMergeReport {
    pub chambers: BTreeMap<House, MergeReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RosterMergeReport {
    pub fn inserted(&self) -> usize {
        self.chambers.values().map(|r| r.inserted.len()).sum()
    }
}

/// Persistence for divisions, chamber rosters and derived networks
pub trait SnapshotStore: Send + Sync {
    fn load_divisions(&self) -> Result<BTreeMap<u64, Division>>;

    fn save_divisions(&self, divisions: &BTreeMap<u64, Division>) -> Result<()>;

    /// Roster of one chamber keyed by person id
    fn load_roster(&self, house: House) -> Result<BTreeMap<u64, Member>>;

    fn save_roster(&self, house: House, roster: &BTreeMap<u64, Member>) -> Result<()>;

    fn save_network(&self, matrix: &CoVoteMatrix) -> Result<()>;

    /// Add divisions not yet stored; stored ones are never replaced
    fn merge_divisions(&self, new_divisions: Vec<Division>) -> Result<MergeReport> {
        let mut existing = self.load_divisions()?;
        let report = merge_records(&mut existing, new_divisions.into_iter().map(|d| (d.id(), d)));
        self.save_divisions(&existing)?;
        Ok(report)
    }

    /// File members into their chamber roster.
    ///
    /// A person id already stored in either chamber stays where it is, so
    /// every id lives in exactly one roster. Members without an id or a
    /// chamber are reported and left out.
    fn merge_members(&self, members: Vec<Member>) -> Result<RosterMergeReport> {
        let mut rosters: BTreeMap<House, BTreeMap<u64, Member>> = BTreeMap::new();
        for house in House::ALL {
            rosters.insert(house, self.load_roster(house)?);
        }

        let mut report = RosterMergeReport::default();
        let mut incoming: BTreeMap<House, Vec<(u64, Member)>> = BTreeMap::new();

        for member in members {
            let Some(id) = member.id else {
                report.diagnostics.push(Diagnostic::new(
                    member.full_name(),
                    DiagnosticKind::Malformed,
                    "member has no person id",
                ));
                continue;
            };
            let Some(house) = member.house else {
                report.diagnostics.push(Diagnostic::new(
                    format!("person {}", id),
                    DiagnosticKind::MissingChamber,
                    format!("{} has no chamber", member.full_name()),
                ));
                continue;
            };
            // Held by the other chamber's roster: keep it there
            if let Some((other, _)) = rosters
                .iter()
                .find(|(h, roster)| **h != house && roster.contains_key(&id))
            {
                debug!(id, stored = %other, latest = %house, "Member already filed under another chamber");
                report.chambers.entry(*other).or_default().already_present.push(id);
                continue;
            }
            incoming.entry(house).or_default().push((id, member));
        }

        for house in House::ALL {
            let roster = rosters.entry(house).or_default();
            let merged = merge_records(roster, incoming.remove(&house).unwrap_or_default());
            let entry = report.chambers.entry(house).or_default();
            entry.inserted.extend(merged.inserted);
            entry.already_present.extend(merged.already_present);
            self.save_roster(house, roster)?;
        }

        Ok(report)
    }

    /// Both chamber rosters as one list, senate last
    fn load_all_members(&self) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        for house in House::ALL {
            members.extend(self.load_roster(house)?.into_values());
        }
        Ok(members)
    }
}
