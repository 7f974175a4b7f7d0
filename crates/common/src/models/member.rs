//! Member models
//!
//! `RawMember` is what `/people.json` hands back, optionally enriched with the
//! `/people/{id}.json` detail. The API nests the interesting fields under
//! `latest_member`, but older exports and hand-written fixtures use a flat
//! shape, so both are accepted here and resolved by the normalizer.

use super::House;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub last: String,
}

/// The `latest_member` block of a person record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestMembership {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<PersonName>,
    #[serde(default)]
    pub electorate: Option<String>,
    #[serde(default)]
    pub house: Option<House>,
    #[serde(default)]
    pub party: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Office {
    #[serde(default)]
    pub position: String,
}

/// Supplementary stats from `/people/{id}.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(default)]
    pub rebellions: Option<u32>,
    #[serde(default)]
    pub votes_attended: Option<u32>,
    #[serde(default)]
    pub votes_possible: Option<u32>,
    #[serde(default)]
    pub offices: Vec<Office>,
}

/// Person record before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub latest_member: Option<LatestMembership>,

    // Flat shape
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub electorate: Option<String>,
    #[serde(default)]
    pub house: Option<House>,

    #[serde(default)]
    pub additional_info: Option<AdditionalInfo>,
}

/// Normalized member, as stored in `senate.json` / `house.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Person id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Id of the latest membership, as referenced by division vote lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub party: String,
    #[serde(default)]
    pub house: Option<House>,
    #[serde(default)]
    pub electorate: Option<String>,
    pub effective_party: String,
    pub color: String,
    #[serde(default)]
    pub rebellions: Option<u32>,
    #[serde(default)]
    pub votes_attended: Option<u32>,
    #[serde(default)]
    pub votes_possible: Option<u32>,
    #[serde(default)]
    pub offices: Vec<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        crate::parliament::join_name(&self.first_name, &self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_nested_person() {
        let raw: RawMember = serde_json::from_value(json!({
            "id": 10001,
            "latest_member": {
                "id": 664,
                "name": { "first": "Tony", "last": "Abbott" },
                "electorate": "Warringah",
                "house": "representatives",
                "party": "Liberal Party"
            }
        }))
        .unwrap();

        let latest = raw.latest_member.unwrap();
        assert_eq!(latest.house, Some(House::Representatives));
        assert_eq!(latest.name.unwrap().last, "Abbott");
        assert!(raw.name.is_none());
    }

    #[test]
    fn test_decode_person_detail_ignores_extras() {
        let info: AdditionalInfo = serde_json::from_value(json!({
            "id": 10001,
            "rebellions": 3,
            "votes_attended": 812,
            "votes_possible": 900,
            "offices": [
                { "position": "Minister for Finance", "from_date": "2022-06-01" }
            ],
            "policy_comparisons": []
        }))
        .unwrap();

        assert_eq!(info.rebellions, Some(3));
        assert_eq!(info.offices[0].position, "Minister for Finance");
    }
}
