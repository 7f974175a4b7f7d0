//! Co-vote network
//!
//! Counts, for every pair of members in a chamber, the divisions in which
//! both voted the same way (both Yes or both No). Absences never count.

use super::votes::{build_vote_table, VoteCast};
use crate::models::{Division, House, Member};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Node of the co-vote network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMember {
    pub id: Option<u64>,
    pub name: String,
    pub effective_party: String,
    pub color: String,
}

/// Symmetric agreement matrix over a chamber roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoVoteMatrix {
    pub house: House,
    /// Row/column order of `matrix`
    pub members: Vec<NetworkMember>,
    pub matrix: Vec<Vec<u32>>,
    pub divisions_counted: usize,
}

impl CoVoteMatrix {
    /// Build the matrix for `house` over every division of that chamber
    #[instrument(skip(divisions, roster))]
    pub fn build<'a>(
        house: House,
        divisions: impl IntoIterator<Item = &'a Division>,
        roster: &[Member],
    ) -> Self {
        let members: Vec<NetworkMember> = roster
            .iter()
            .filter(|m| m.house == Some(house))
            .map(|m| NetworkMember {
                id: m.id,
                name: m.full_name(),
                effective_party: m.effective_party.clone(),
                color: m.color.clone(),
            })
            .collect();

        let n = members.len();
        let mut matrix = vec![vec![0u32; n]; n];
        let mut divisions_counted = 0;

        for division in divisions.into_iter().filter(|d| d.house() == house) {
            // Rows come back in the same filtered roster order as `members`
            let table = build_vote_table(division, roster);
            let votes: Vec<VoteCast> = table.items.iter().map(|r| r.vote).collect();
            divisions_counted += 1;

            for i in 0..n {
                if votes[i] == VoteCast::Absent {
                    continue;
                }
                for j in (i + 1)..n {
                    if votes[i] == votes[j] {
                        matrix[i][j] += 1;
                        matrix[j][i] += 1;
                    }
                }
            }
        }

        debug!(members = n, divisions_counted, "Co-vote matrix built");

        Self {
            house,
            members,
            matrix,
            divisions_counted,
        }
    }

    /// Agreement count between two members by person id
    pub fn agreement(&self, a: u64, b: u64) -> Option<u32> {
        let i = self.members.iter().position(|m| m.id == Some(a))?;
        let j = self.members.iter().position(|m| m.id == Some(b))?;
        Some(self.matrix[i][j])
    }

    /// Non-zero pairs `(i, j, weight)` with `i < j`, i.e. the graph edges
    pub fn edges(&self) -> Vec<(usize, usize, u32)> {
        let mut edges = Vec::new();
        for (i, row) in self.matrix.iter().enumerate() {
            for (j, &weight) in row.iter().enumerate().skip(i + 1) {
                if weight > 0 {
                    edges.push((i, j, weight));
                }
            }
        }
        edges
    }
}
