//! Per-division vote tables
//!
//! Every roster member of the division's chamber gets exactly one row,
//! starting out as `Absent`. Vote records are then joined onto the rows:
//! by person id, then by membership id, and only then by the
//! `first_last_party` name key. Name-key joins and records that land nowhere
//! are reported as diagnostics rather than errors, since rosters drift
//! (party changes, retirements) while historical divisions do not.

use crate::diagnostics::{BatchOutcome, Diagnostic, DiagnosticKind};
use crate::models::{Ballot, Division, Member, MemberRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, instrument};

/// A member's position in one division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteCast {
    Yes,
    No,
    Absent,
}

impl From<&Ballot> for VoteCast {
    fn from(ballot: &Ballot) -> Self {
        if ballot.is_aye() {
            VoteCast::Yes
        } else {
            VoteCast::No
        }
    }
}

impl fmt::Display for VoteCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VoteCast::Yes => "Yes",
            VoteCast::No => "No",
            VoteCast::Absent => "Absent",
        })
    }
}

/// One row of a division's vote table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualVoteRow {
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Electorate")]
    pub electorate: Option<String>,
    #[serde(rename = "Party")]
    pub party: String,
    #[serde(rename = "Effective Party")]
    pub effective_party: String,
    #[serde(rename = "Vote")]
    pub vote: VoteCast,
    /// Person id of the roster member behind this row
    #[serde(skip)]
    pub person_id: Option<u64>,
}

/// Identity key shared by roster rows and vote records
pub fn roster_key(first_name: &str, last_name: &str, party: &str) -> String {
    format!("{}_{}_{}", first_name.trim(), last_name.trim(), party.trim())
}

#[derive(Default)]
struct RosterIndex {
    by_person: HashMap<u64, usize>,
    by_membership: HashMap<u64, usize>,
    by_key: HashMap<String, usize>,
}

impl RosterIndex {
    fn insert(&mut self, row: usize, member: &Member) {
        if let Some(id) = member.id {
            self.by_person.entry(id).or_insert(row);
        }
        if let Some(id) = member.member_id {
            self.by_membership.entry(id).or_insert(row);
        }
        self.by_key
            .entry(roster_key(&member.first_name, &member.last_name, &member.party))
            .or_insert(row);
    }

    /// Row for a vote record and whether the name key had to be used
    fn locate(&self, voter: &MemberRef) -> Option<(usize, bool)> {
        if let Some(row) = voter.person_id().and_then(|id| self.by_person.get(&id)) {
            return Some((*row, false));
        }
        if let Some(row) = voter.id.and_then(|id| self.by_membership.get(&id)) {
            return Some((*row, false));
        }
        self.by_key
            .get(&roster_key(&voter.first_name, &voter.last_name, &voter.party))
            .map(|row| (*row, true))
    }
}

/// Build the vote table for `division` from the chamber roster.
///
/// Roster members of the other chamber (or with no chamber) are ignored.
/// Rows keep roster order.
#[instrument(skip_all, fields(division_id = division.id(), house = %division.house()))]
pub fn build_vote_table(division: &Division, roster: &[Member]) -> BatchOutcome<IndividualVoteRow> {
    let house = division.house();
    let mut outcome = BatchOutcome::new();
    let mut index = RosterIndex::default();

    for member in roster.iter().filter(|m| m.house == Some(house)) {
        index.insert(outcome.items.len(), member);
        outcome.push(IndividualVoteRow {
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            electorate: member.electorate.clone(),
            party: member.party.clone(),
            effective_party: member.effective_party.clone(),
            vote: VoteCast::Absent,
            person_id: member.id,
        });
    }

    for record in &division.votes {
        let voter = &record.member;
        match index.locate(voter) {
            Some((row, used_name_key)) => {
                outcome.items[row].vote = VoteCast::from(&record.vote);
                if used_name_key {
                    outcome.report(Diagnostic::new(
                        voter.full_name(),
                        DiagnosticKind::FallbackMatch,
                        format!(
                            "division {} vote joined on name+party key '{}'",
                            division.id(),
                            roster_key(&voter.first_name, &voter.last_name, &voter.party)
                        ),
                    ));
                }
            }
            None => outcome.report(Diagnostic::new(
                voter.full_name(),
                DiagnosticKind::UnmatchedVote,
                format!(
                    "division {} vote by {} ({}) has no roster row",
                    division.id(),
                    voter.full_name(),
                    voter.party
                ),
            )),
        }
    }

    debug!(
        rows = outcome.items.len(),
        votes = division.votes.len(),
        unmatched = outcome.skipped(),
        "Vote table built"
    );
    outcome
}

/// Yes/No/Absent counts for one effective party
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTally {
    pub yes: usize,
    pub no: usize,
    pub absent: usize,
}

impl PartyTally {
    pub fn record(&mut self, vote: VoteCast) {
        match vote {
            VoteCast::Yes => self.yes += 1,
            VoteCast::No => self.no += 1,
            VoteCast::Absent => self.absent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.yes + self.no + self.absent
    }
}

/// Tally a vote table by effective party
pub fn tally_by_party(rows: &[IndividualVoteRow]) -> BTreeMap<String, PartyTally> {
    let mut tallies: BTreeMap<String, PartyTally> = BTreeMap::new();
    for row in rows {
        tallies
            .entry(row.effective_party.clone())
            .or_default()
            .record(row.vote);
    }
    tallies
}

/// First division whose name matches exactly
pub fn find_division_by_name<'a>(
    divisions: impl IntoIterator<Item = &'a Division>,
    name: &str,
) -> Option<&'a Division> {
    divisions.into_iter().find(|d| d.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::House;
    use serde_json::json;

    fn member(id: u64, first: &str, last: &str, party: &str, house: House) -> Member {
        Member {
            id: Some(id),
            member_id: None,
            first_name: first.into(),
            last_name: last.into(),
            party: party.into(),
            house: Some(house),
            electorate: Some("Somewhere".into()),
            effective_party: party.into(),
            color: "gray".into(),
            rebellions: None,
            votes_attended: None,
            votes_possible: None,
            offices: vec![],
        }
    }

    fn division(house: House, votes: serde_json::Value) -> Division {
        serde_json::from_value(json!({
            "id": 42,
            "house": house.as_str(),
            "name": "Motions - Test",
            "date": "2024-02-08",
            "votes": votes
        }))
        .unwrap()
    }

    fn roster() -> Vec<Member> {
        vec![
            member(1, "A", "B", "X", House::Senate),
            member(2, "C", "D", "Y", House::Senate),
            member(3, "E", "F", "X", House::Senate),
            member(4, "G", "H", "X", House::Representatives),
        ]
    }

    #[test]
    fn test_single_aye_among_three() {
        let division = division(
            House::Senate,
            json!([{ "member": { "first_name": "A", "last_name": "B", "party": "X" }, "vote": "aye" }]),
        );

        let table = build_vote_table(&division, &roster());
        assert_eq!(table.items.len(), 3);
        assert_eq!(table.items[0].vote, VoteCast::Yes);
        assert_eq!(table.items[1].vote, VoteCast::Absent);
        assert_eq!(table.items[2].vote, VoteCast::Absent);
        // joined without a person id, so flagged for review
        assert_eq!(table.diagnostics.len(), 1);
        assert_eq!(table.diagnostics[0].kind, DiagnosticKind::FallbackMatch);
        assert_eq!(table.skipped(), 0);
    }

    #[test]
    fn test_empty_vote_list_is_all_absent() {
        let table = build_vote_table(&division(House::Senate, json!([])), &roster());
        assert_eq!(table.items.len(), 3);
        assert!(table.items.iter().all(|r| r.vote == VoteCast::Absent));
        assert!(table.diagnostics.is_empty());
    }

    #[test]
    fn test_person_id_join_survives_party_change() {
        let division = division(
            House::Senate,
            json!([{
                "member": { "first_name": "C", "last_name": "D", "party": "Old Party", "person": { "id": 2 } },
                "vote": "no"
            }]),
        );

        let table = build_vote_table(&division, &roster());
        assert_eq!(table.items[1].vote, VoteCast::No);
        assert!(table.diagnostics.is_empty());
    }

    #[test]
    fn test_membership_id_join() {
        let mut roster = roster();
        roster[2].member_id = Some(703);
        let division = division(
            House::Senate,
            json!([{
                "member": { "id": 703, "first_name": "Eve", "last_name": "F", "party": "Renamed" },
                "vote": "tellno"
            }]),
        );

        let table = build_vote_table(&division, &roster);
        assert_eq!(table.items[2].vote, VoteCast::No);
        assert_eq!(table.diagnostics_of(|k| matches!(k, DiagnosticKind::FallbackMatch)).count(), 0);
        assert!(table.diagnostics.is_empty());
    }

    #[test]
    fn test_unmatched_votes_are_reported_not_raised() {
        let division = division(
            House::Senate,
            json!([
                { "member": { "first_name": "Z", "last_name": "Q", "party": "X", "person": { "id": 99 } }, "vote": "aye" },
                { "member": { "first_name": "E", "last_name": "F", "party": "X", "person": { "id": 3 } }, "vote": "aye" }
            ]),
        );

        let table = build_vote_table(&division, &roster());
        assert_eq!(table.items.len(), 3);
        assert_eq!(table.items[2].vote, VoteCast::Yes);
        assert_eq!(table.skipped(), 1);
        assert_eq!(table.diagnostics[0].kind, DiagnosticKind::UnmatchedVote);
    }

    #[test]
    fn test_empty_roster_for_house() {
        let division = division(
            House::Representatives,
            json!([{ "member": { "first_name": "A", "last_name": "B", "party": "X" }, "vote": "aye" }]),
        );
        let senate_only: Vec<Member> = roster().into_iter().filter(|m| m.house == Some(House::Senate)).collect();

        let table = build_vote_table(&division, &senate_only);
        assert!(table.items.is_empty());
        assert_eq!(table.skipped(), 1);
    }

    #[test]
    fn test_roster_completeness_across_houses() {
        let roster = roster();
        for house in House::ALL {
            let expected = roster.iter().filter(|m| m.house == Some(house)).count();
            let table = build_vote_table(&division(house, json!([])), &roster);
            assert_eq!(table.items.len(), expected);
        }
    }

    #[test]
    fn test_tally_by_party() {
        let division = division(
            House::Senate,
            json!([
                { "member": { "first_name": "A", "last_name": "B", "party": "X", "person": { "id": 1 } }, "vote": "aye" },
                { "member": { "first_name": "C", "last_name": "D", "party": "Y", "person": { "id": 2 } }, "vote": "no" }
            ]),
        );
        let table = build_vote_table(&division, &roster());
        let tally = tally_by_party(&table.items);

        assert_eq!(tally["X"], PartyTally { yes: 1, no: 0, absent: 1 });
        assert_eq!(tally["Y"], PartyTally { yes: 0, no: 1, absent: 0 });
        assert_eq!(tally.values().map(PartyTally::total).sum::<usize>(), 3);
    }

    #[test]
    fn test_row_serializes_with_display_headers() {
        let table = build_vote_table(&division(House::Senate, json!([])), &roster());
        let row = serde_json::to_value(&table.items[0]).unwrap();
        assert_eq!(row["First Name"], "A");
        assert_eq!(row["Effective Party"], "X");
        assert_eq!(row["Vote"], "Absent");
        assert!(row.get("person_id").is_none());
    }

    #[test]
    fn test_find_division_by_name() {
        let divisions = vec![division(House::Senate, json!([]))];
        assert!(find_division_by_name(&divisions, "Motions - Test").is_some());
        assert!(find_division_by_name(&divisions, "Motions").is_none());
    }
}
