//! In-memory snapshot store for tests and dry runs

use super::SnapshotStore;
use crate::errors::{AppError, Result};
use crate::models::{Division, House, Member};
use crate::parliament::CoVoteMatrix;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    divisions: Mutex<BTreeMap<u64, Division>>,
    rosters: Mutex<BTreeMap<House, BTreeMap<u64, Member>>>,
    networks: Mutex<BTreeMap<House, CoVoteMatrix>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| AppError::Internal {
        message: "memory store lock poisoned".to_string(),
    })
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last co-vote matrix saved for `house`
    pub fn network(&self, house: House) -> Option<CoVoteMatrix> {
        lock(&self.networks).ok()?.get(&house).cloned()
    }
}

impl SnapshotStore for MemoryStore {
    fn load_divisions(&self) -> Result<BTreeMap<u64, Division>> {
        Ok(lock(&self.divisions)?.clone())
    }

    fn save_divisions(&self, divisions: &BTreeMap<u64, Division>) -> Result<()> {
        *lock(&self.divisions)? = divisions.clone();
        Ok(())
    }

    fn load_roster(&self, house: House) -> Result<BTreeMap<u64, Member>> {
        Ok(lock(&self.rosters)?.get(&house).cloned().unwrap_or_default())
    }

    fn save_roster(&self, house: House, roster: &BTreeMap<u64, Member>) -> Result<()> {
        lock(&self.rosters)?.insert(house, roster.clone());
        Ok(())
    }

    fn save_network(&self, matrix: &CoVoteMatrix) -> Result<()> {
        lock(&self.networks)?.insert(matrix.house, matrix.clone());
        Ok(())
    }
}
