//! Snapshot store backed by JSON files in one directory

use super::{load, write_json, SnapshotStore, DIVISIONS_FILE};
use crate::errors::{AppError, Result};
use crate::models::{Division, House, Member};
use crate::parliament::CoVoteMatrix;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores `divisions.json`, `house.json`, `senate.json` and the co-vote
/// matrices under `data_dir`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn divisions_path(&self) -> PathBuf {
        self.data_dir.join(DIVISIONS_FILE)
    }

    pub fn roster_path(&self, house: House) -> PathBuf {
        self.data_dir.join(house.roster_file())
    }

    pub fn network_path(&self, house: House) -> PathBuf {
        self.data_dir.join(format!("{}_interaction_matrix.json", house.as_str()))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load_divisions(&self) -> Result<BTreeMap<u64, Division>> {
        load(&self.divisions_path())
    }

    fn save_divisions(&self, divisions: &BTreeMap<u64, Division>) -> Result<()> {
        write_json(&self.divisions_path(), divisions)
    }

    fn load_roster(&self, house: House) -> Result<BTreeMap<u64, Member>> {
        let path = self.roster_path(house);
        if !path.exists() {
            debug!(path = %path.display(), "No roster yet");
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&path).map_err(|e| AppError::snapshot_io(&path, e))?;
        let members: Vec<Member> =
            serde_json::from_slice(&bytes).map_err(|e| AppError::snapshot_io(&path, e))?;

        let mut roster = BTreeMap::new();
        for member in members {
            match member.id {
                Some(id) => {
                    roster.entry(id).or_insert(member);
                }
                None => warn!(name = %member.full_name(), "Stored member without person id ignored"),
            }
        }
        Ok(roster)
    }

    /// Rosters are written as lists ordered by person id
    fn save_roster(&self, house: House, roster: &BTreeMap<u64, Member>) -> Result<()> {
        let members: Vec<&Member> = roster.values().collect();
        write_json(&self.roster_path(house), &members)
    }

    fn save_network(&self, matrix: &CoVoteMatrix) -> Result<()> {
        write_json(&self.network_path(matrix.house), matrix)
    }
}
