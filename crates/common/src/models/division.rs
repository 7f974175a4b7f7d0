//! Division models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parliamentary chamber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum House {
    Representatives,
    Senate,
}

impl House {
    pub const ALL: [House; 2] = [House::Representatives, House::Senate];

    pub fn as_str(&self) -> &'static str {
        match self {
            House::Representatives => "representatives",
            House::Senate => "senate",
        }
    }

    /// Roster snapshot file name for this chamber
    pub fn roster_file(&self) -> &'static str {
        match self {
            House::Representatives => "house.json",
            House::Senate => "senate.json",
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for House {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "representatives" | "house" | "reps" => Ok(House::Representatives),
            "senate" => Ok(House::Senate),
            other => Err(crate::AppError::MalformedRecord {
                record: "house".into(),
                message: format!("unknown chamber '{}'", other),
            }),
        }
    }
}

/// Division as listed by `/divisions.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionSummary {
    pub id: u64,
    pub house: House,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub clock_time: Option<String>,
    #[serde(default)]
    pub aye_votes: u32,
    #[serde(default)]
    pub no_votes: u32,
    #[serde(default)]
    pub possible_turnout: u32,
    #[serde(default)]
    pub rebellions: u32,
    /// Upstream fields not modelled here (number, edited, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Full division record as returned by `/divisions/{id}.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    #[serde(flatten)]
    pub header: DivisionSummary,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub votes: Vec<VoteRecord>,
}

impl Division {
    pub fn id(&self) -> u64 {
        self.header.id
    }

    pub fn house(&self) -> House {
        self.header.house
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }
}

/// How a member voted.
///
/// Values other than `aye` and `no` (e.g. `tellno`) count as a no but keep
/// their upstream spelling when written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ballot {
    Aye,
    No,
    Other(String),
}

impl Ballot {
    pub fn is_aye(&self) -> bool {
        matches!(self, Ballot::Aye)
    }
}

impl From<String> for Ballot {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "aye" => Ballot::Aye,
            "no" => Ballot::No,
            _ => Ballot::Other(raw),
        }
    }
}

impl From<Ballot> for String {
    fn from(ballot: Ballot) -> Self {
        match ballot {
            Ballot::Aye => "aye".to_string(),
            Ballot::No => "no".to_string(),
            Ballot::Other(raw) => raw,
        }
    }
}

/// One member's vote in a division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub member: MemberRef,
    pub vote: Ballot,
}

/// Member as embedded in a division's vote list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRef {
    /// Membership id (changes when a person is re-elected to another seat)
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub electorate: Option<String>,
    #[serde(default)]
    pub house: Option<House>,
    #[serde(default)]
    pub person: Option<PersonRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: u64,
}

impl MemberRef {
    /// Stable person id, when the API supplied one
    pub fn person_id(&self) -> Option<u64> {
        self.person.map(|p| p.id)
    }

    pub fn full_name(&self) -> String {
        crate::parliament::join_name(&self.first_name, &self.last_name)
    }
}
