//! Parliament domain logic
//!
//! - Member normalization and effective-party mapping
//! - Per-division vote tables and party tallies
//! - Division name categorization
//! - Co-vote network between members of a chamber

mod categorizer;
mod network;
mod normalizer;
mod parties;
mod votes;

pub use categorizer::{categorize, DivisionCategory, BILLS_AND_AMENDMENTS, COMMITTEES, SPLIT_PREFIXES};
pub use network::{CoVoteMatrix, NetworkMember};
pub use normalizer::MemberNormalizer;
pub use parties::{count_by_party, EffectivePartyMap, PartyCount, PartyPalette, PartyTier, DEFAULT_COLOR, INDEPENDENT};
pub use votes::{
    build_vote_table, find_division_by_name, roster_key, tally_by_party, IndividualVoteRow, PartyTally,
    VoteCast,
};

/// Join first and last name, tolerating an empty last name
pub fn join_name(first: &str, last: &str) -> String {
    match (first.trim(), last.trim()) {
        (f, "") => f.to_string(),
        ("", l) => l.to_string(),
        (f, l) => format!("{} {}", f, l),
    }
}

#[cfg(test)]
mod tests {
    use super::join_name;

    #[test]
    fn test_join_name() {
        assert_eq!(join_name("David", "Pocock"), "David Pocock");
        assert_eq!(join_name("Cher", ""), "Cher");
        assert_eq!(join_name(" Lidia ", "Thorpe "), "Lidia Thorpe");
    }
}
