//! Per-division reports and chamber co-vote networks built from the snapshots

use crate::errors::IngestionError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};
use votewatch_common::diagnostics::Diagnostic;
use votewatch_common::errors::AppError;
use votewatch_common::models::{Division, House, Member};
use votewatch_common::parliament::{
    build_vote_table, categorize, count_by_party, find_division_by_name, tally_by_party, CoVoteMatrix,
    DivisionCategory, IndividualVoteRow, PartyCount, PartyTally, PartyTier,
};
use votewatch_common::SnapshotStore;

/// Everything known about one division, joined against the stored roster
#[derive(Debug, Clone, Serialize)]
pub struct DivisionReport {
    pub id: u64,
    pub house: House,
    pub name: String,
    pub date: NaiveDate,
    pub category: DivisionCategory,
    pub votes: Vec<IndividualVoteRow>,
    pub tally: BTreeMap<String, PartyTally>,
    pub by_tier: TierTally,
    pub totals: PartyTally,
    pub diagnostics: Vec<Diagnostic>,
}

/// Party tallies folded into major parties vs. everyone else
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierTally {
    pub major: PartyTally,
    pub minor_or_independent: PartyTally,
}

fn add(acc: PartyTally, t: &PartyTally) -> PartyTally {
    PartyTally {
        yes: acc.yes + t.yes,
        no: acc.no + t.no,
        absent: acc.absent + t.absent,
    }
}

impl DivisionReport {
    pub fn build(division: &Division, roster: &[Member]) -> Self {
        let table = build_vote_table(division, roster);
        let tally = tally_by_party(&table.items);
        let totals = tally.values().fold(PartyTally::default(), add);

        let mut by_tier = TierTally::default();
        for (party, t) in &tally {
            let slot = match PartyTier::of(party) {
                PartyTier::Major => &mut by_tier.major,
                PartyTier::MinorOrIndependent => &mut by_tier.minor_or_independent,
            };
            *slot = add(*slot, t);
        }

        Self {
            id: division.id(),
            house: division.house(),
            name: division.name().to_string(),
            date: division.header.date,
            category: categorize(division.name()),
            votes: table.items,
            tally,
            by_tier,
            totals,
            diagnostics: table.diagnostics,
        }
    }
}

/// Report for a stored division, looked up by id
#[instrument(skip(store))]
pub fn division_report(store: &dyn SnapshotStore, id: u64) -> Result<DivisionReport, IngestionError> {
    let divisions = store.load_divisions()?;
    let division = divisions.get(&id).ok_or(AppError::DivisionNotFound { id })?;
    let roster = store.load_all_members()?;
    Ok(DivisionReport::build(division, &roster))
}

/// Report for a stored division, looked up by its exact name
#[instrument(skip(store))]
pub fn division_report_by_name(store: &dyn SnapshotStore, name: &str) -> Result<DivisionReport, IngestionError> {
    let divisions = store.load_divisions()?;
    let division = find_division_by_name(divisions.values(), name).ok_or_else(|| AppError::NotFound {
        resource_type: "division".to_string(),
        id: name.to_string(),
    })?;
    let roster = store.load_all_members()?;
    Ok(DivisionReport::build(division, &roster))
}

/// Stored members per chamber and raw party
pub fn roster_summary(store: &dyn SnapshotStore) -> Result<Vec<PartyCount>, IngestionError> {
    let members = store.load_all_members()?;
    Ok(count_by_party(&members))
}

/// Build the co-vote matrix for `house` from the snapshots and save it
#[instrument(skip(store))]
pub fn build_network(store: &dyn SnapshotStore, house: House) -> Result<CoVoteMatrix, IngestionError> {
    let roster: Vec<Member> = store.load_roster(house)?.into_values().collect();
    if roster.is_empty() {
        return Err(IngestionError::EmptyRoster(house));
    }
    let divisions = store.load_divisions()?;

    let matrix = CoVoteMatrix::build(house, divisions.values(), &roster);
    store.save_network(&matrix).map_err(IngestionError::Snapshot)?;

    info!(
        members = matrix.members.len(),
        divisions = matrix.divisions_counted,
        edges = matrix.edges().len(),
        "Co-vote network saved"
    );
    Ok(matrix)
}
