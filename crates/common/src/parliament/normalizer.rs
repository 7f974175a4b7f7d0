//! Member normalization
//!
//! Resolves the nested-or-flat person record into a `Member`:
//! 1. Names from `latest_member.name`, else flat `first_name`/`last_name`,
//!    else the first two whitespace tokens of `name`
//! 2. Effective party from the fixed map, independents split out
//! 3. Colour from the palette

use super::parties::{EffectivePartyMap, PartyPalette};
use crate::diagnostics::{BatchOutcome, Diagnostic, DiagnosticKind};
use crate::errors::{AppError, Result};
use crate::models::{AdditionalInfo, Member, RawMember};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default)]
pub struct MemberNormalizer {
    parties: EffectivePartyMap,
    palette: PartyPalette,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl MemberNormalizer {
    /// Normalize one raw person record
    pub fn normalize(&self, raw: &RawMember) -> Result<Member> {
        let latest = raw.latest_member.as_ref();
        let (first_name, last_name) = Self::resolve_name(raw)?;

        let party = non_empty(latest.and_then(|l| l.party.as_deref()))
            .or_else(|| non_empty(raw.party.as_deref()))
            .ok_or_else(|| AppError::MalformedRecord {
                record: "member".into(),
                message: format!("{} has no party", super::join_name(&first_name, &last_name)),
            })?
            .to_string();

        let effective_party = self.parties.effective_party(&party, &first_name, &last_name);
        let color = self.palette.color_for(&effective_party).to_string();

        let info = raw.additional_info.clone().unwrap_or_default();
        let AdditionalInfo {
            rebellions,
            votes_attended,
            votes_possible,
            offices,
        } = info;

        Ok(Member {
            id: raw.id,
            member_id: latest.and_then(|l| l.id),
            first_name,
            last_name,
            party,
            house: latest.and_then(|l| l.house).or(raw.house),
            electorate: latest
                .and_then(|l| l.electorate.clone())
                .or_else(|| raw.electorate.clone()),
            effective_party,
            color,
            rebellions,
            votes_attended,
            votes_possible,
            offices: offices.into_iter().map(|o| o.position).collect(),
        })
    }

    /// Normalize a roster, skipping malformed records
    #[instrument(skip_all)]
    pub fn normalize_all<'a>(&self, raws: impl IntoIterator<Item = &'a RawMember>) -> BatchOutcome<Member> {
        let mut outcome = BatchOutcome::new();
        for raw in raws {
            match self.normalize(raw) {
                Ok(member) => outcome.push(member),
                Err(e) => outcome.report(Diagnostic::new(
                    Self::subject(raw),
                    DiagnosticKind::Malformed,
                    e.to_string(),
                )),
            }
        }
        debug!(
            normalized = outcome.items.len(),
            skipped = outcome.skipped(),
            "Roster normalized"
        );
        outcome
    }

    fn resolve_name(raw: &RawMember) -> Result<(String, String)> {
        if let Some(name) = raw.latest_member.as_ref().and_then(|l| l.name.as_ref()) {
            if !name.first.trim().is_empty() {
                return Ok((name.first.trim().to_string(), name.last.trim().to_string()));
            }
        }

        let mut tokens = raw.name.as_deref().unwrap_or_default().split_whitespace();
        let first_token = tokens.next();
        let second_token = tokens.next();

        let first = non_empty(raw.first_name.as_deref()).or(first_token);
        let last = non_empty(raw.last_name.as_deref()).or(second_token);

        match (first, last) {
            (Some(first), Some(last)) => Ok((first.to_string(), last.to_string())),
            (Some(first), None) => {
                debug!(name = first, "Single-token member name, last name left empty");
                Ok((first.to_string(), String::new()))
            }
            (None, _) => Err(AppError::MissingField {
                field: "member name".into(),
            }),
        }
    }

    fn subject(raw: &RawMember) -> String {
        match raw.id {
            Some(id) => format!("person {}", id),
            None => raw
                .name
                .clone()
                .unwrap_or_else(|| "person without id".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::House;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawMember {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_nested_member() {
        let normalizer = MemberNormalizer::default();
        let member = normalizer
            .normalize(&raw(json!({
                "id": 10725,
                "latest_member": {
                    "id": 100843,
                    "name": { "first": "Sarah", "last": "Hanson-Young" },
                    "electorate": "SA",
                    "house": "senate",
                    "party": "Australian Greens"
                },
                "additional_info": {
                    "rebellions": 0,
                    "votes_attended": 1500,
                    "votes_possible": 1600,
                    "offices": [{ "position": "Whip" }]
                }
            })))
            .unwrap();

        assert_eq!(member.id, Some(10725));
        assert_eq!(member.member_id, Some(100843));
        assert_eq!(member.full_name(), "Sarah Hanson-Young");
        assert_eq!(member.house, Some(House::Senate));
        assert_eq!(member.effective_party, "Australian Greens");
        assert_eq!(member.color, "#009C3D");
        assert_eq!(member.votes_attended, Some(1500));
        assert_eq!(member.offices, vec!["Whip".to_string()]);
    }

    #[test]
    fn test_flat_independent_uses_own_name() {
        let normalizer = MemberNormalizer::default();
        let member = normalizer
            .normalize(&raw(json!({
                "name": "Jacqui Lambie Network",
                "party": "Independent",
                "first_name": "David",
                "last_name": "Pocock"
            })))
            .unwrap();

        assert_eq!(member.effective_party, "David Pocock");
        assert_eq!(member.color, "#4ef8a6");
    }

    #[test]
    fn test_flat_name_split() {
        let normalizer = MemberNormalizer::default();
        let member = normalizer
            .normalize(&raw(json!({ "name": "Andrew Wilkie", "party": "Independent" })))
            .unwrap();
        assert_eq!(member.first_name, "Andrew");
        assert_eq!(member.last_name, "Wilkie");
        assert_eq!(member.effective_party, "Andrew Wilkie");
        assert_eq!(member.color, "gray");
    }

    #[test]
    fn test_mapped_party_colour() {
        let normalizer = MemberNormalizer::default();
        let member = normalizer
            .normalize(&raw(json!({
                "latest_member": {
                    "name": { "first": "Mark", "last": "Coulton" },
                    "house": "representatives",
                    "party": "National Party"
                }
            })))
            .unwrap();
        assert_eq!(member.effective_party, "Liberal National Party");
        assert_eq!(member.color, "#1C4F9C");
    }

    #[test]
    fn test_single_token_name() {
        let normalizer = MemberNormalizer::default();
        let member = normalizer
            .normalize(&raw(json!({ "name": "Madonna", "party": "Independent" })))
            .unwrap();
        assert_eq!(member.last_name, "");
        assert_eq!(member.effective_party, "Madonna");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let normalizer = MemberNormalizer::default();
        let raws = vec![
            raw(json!({ "id": 1, "party": "Australian Greens" })),
            raw(json!({ "id": 2, "name": "Jane Citizen" })),
            raw(json!({ "id": 3, "name": "Penny Wong", "party": "Australian Labor Party" })),
        ];

        let outcome = normalizer.normalize_all(&raws);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].id, Some(3));
        assert_eq!(outcome.skipped(), 2);
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::Malformed));
        assert_eq!(outcome.diagnostics[0].subject, "person 1");
    }

    #[test]
    fn test_effective_party_is_never_empty() {
        let normalizer = MemberNormalizer::default();
        let raws: Vec<RawMember> = ["Independent", "Liberal Party", "United Australia Party", "CWM"]
            .iter()
            .map(|party| raw(json!({ "first_name": "Alex", "last_name": "Smith", "party": party })))
            .collect();

        for member in normalizer.normalize_all(&raws).items {
            assert!(!member.effective_party.is_empty());
        }
    }
}
