//! Party groupings and display colours

use crate::models::{House, Member};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Raw and effective label for members without a party
pub const INDEPENDENT: &str = "Independent";

/// Colour for any effective party missing from the palette
pub const DEFAULT_COLOR: &str = "gray";

/// Raw party -> effective grouping. Presiding officers (PRES, DPRES, SPK, CWM)
/// are folded into the party that holds the chair.
const EFFECTIVE_PARTIES: &[(&str, &str)] = &[
    ("Country Liberal Party", "Liberal National Party"),
    ("DPRES", "Australian Labor Party"),
    ("Liberal Party", "Liberal National Party"),
    ("National Party", "Liberal National Party"),
    ("PRES", "Australian Labor Party"),
    ("Centre Alliance", INDEPENDENT),
    ("CWM", "Liberal National Party"),
    ("Katter's Australian Party", INDEPENDENT),
    ("SPK", "Australian Labor Party"),
];

const PARTY_COLORS: &[(&str, &str)] = &[
    ("Australian Greens", "#009C3D"),
    ("Australian Labor Party", "#E13940"),
    ("David Pocock", "#4ef8a6"),
    ("Lidia Thorpe", "#7A3535"),
    ("Jacqui Lambie Network", "#FFFFFF"),
    ("Liberal National Party", "#1C4F9C"),
    ("Pauline Hanson's One Nation Party", "#F36D24"),
    ("United Australia Party", "#ffed00"),
];

const MAJOR_PARTIES: &[&str] = &[
    "Australian Labor Party",
    "Liberal National Party",
    "Australian Greens",
];

/// Fixed lookup from raw party name to its canonical grouping
#[derive(Debug, Clone)]
pub struct EffectivePartyMap {
    map: HashMap<String, String>,
}

impl Default for EffectivePartyMap {
    fn default() -> Self {
        Self {
            map: EFFECTIVE_PARTIES
                .iter()
                .map(|(raw, effective)| (raw.to_string(), effective.to_string()))
                .collect(),
        }
    }
}

impl EffectivePartyMap {
    /// Mapped grouping, or the raw party itself when unmapped
    pub fn resolve<'a>(&'a self, raw_party: &'a str) -> &'a str {
        self.map.get(raw_party).map(String::as_str).unwrap_or(raw_party)
    }

    /// Effective party for a member. Independents become their own grouping.
    pub fn effective_party(&self, raw_party: &str, first_name: &str, last_name: &str) -> String {
        let mapped = self.resolve(raw_party.trim());
        if mapped == INDEPENDENT {
            let own = super::join_name(first_name, last_name);
            if !own.is_empty() {
                return own;
            }
        }
        if mapped.is_empty() {
            INDEPENDENT.to_string()
        } else {
            mapped.to_string()
        }
    }
}

/// Deterministic display colour per effective party
#[derive(Debug, Clone)]
pub struct PartyPalette {
    colors: HashMap<String, String>,
}

impl Default for PartyPalette {
    fn default() -> Self {
        Self {
            colors: PARTY_COLORS
                .iter()
                .map(|(party, color)| (party.to_string(), color.to_string()))
                .collect(),
        }
    }
}

impl PartyPalette {
    pub fn color_for(&self, effective_party: &str) -> &str {
        self.colors
            .get(effective_party)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }
}

/// Major parties vs. minor parties and independents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyTier {
    Major,
    MinorOrIndependent,
}

impl PartyTier {
    pub fn of(effective_party: &str) -> Self {
        if MAJOR_PARTIES.contains(&effective_party) {
            PartyTier::Major
        } else {
            PartyTier::MinorOrIndependent
        }
    }
}

/// Members per chamber and raw party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyCount {
    pub house: House,
    pub party: String,
    pub count: usize,
}

/// Count members by (chamber, raw party), sorted by chamber then party
pub fn count_by_party<'a>(members: impl IntoIterator<Item = &'a Member>) -> Vec<PartyCount> {
    let mut counts: BTreeMap<(House, String), usize> = BTreeMap::new();
    for member in members {
        if let Some(house) = member.house {
            *counts.entry((house, member.party.clone())).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((house, party), count)| PartyCount { house, party, count })
        .collect()
}
