//! Division name categorization
//!
//! Division names encode a loose hierarchy, e.g.
//! `Committees - Procedure; Report` or
//! `Treasury Laws Amendment Bill 2023 - Third Reading`.
//! Rules are tried in order and the first match wins.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Category for everything that no prefix rule claims
pub const BILLS_AND_AMENDMENTS: &str = "Bills and Amendments";

pub const COMMITTEES: &str = "Committees";

/// Prefixes whose names split cleanly on " - "
pub const SPLIT_PREFIXES: [&str; 4] = ["Matters of Urgency", "Documents", "Motions", "Business"];

const DELIMITER: &str = " - ";

/// Up to three levels parsed from a division name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DivisionCategory {
    pub category: String,
    pub subcategory: Option<String>,
    pub subsubcategory: Option<String>,
}

impl DivisionCategory {
    fn from_parts(category: &str, subcategory: Option<&str>, subsubcategory: Option<&str>) -> Self {
        let clean = |part: Option<&str>| part.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
        Self {
            category: category.trim().to_string(),
            subcategory: clean(subcategory),
            subsubcategory: clean(subsubcategory),
        }
    }

    /// Number of levels that are set
    pub fn depth(&self) -> usize {
        1 + self.subcategory.is_some() as usize + self.subsubcategory.is_some() as usize
    }
}

fn committee_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^(?P<cat>.+?) - (?P<sub>.+?); (?P<subsub>.+)$").expect("valid committee pattern"),
            Regex::new(r"^(?P<cat>.+?) - (?P<sub>.+?) - (?P<subsub>.+)$").expect("valid committee pattern"),
        ]
    })
}

fn split_on_delimiter(name: &str) -> DivisionCategory {
    let mut parts = name.splitn(3, DELIMITER);
    let category = parts.next().unwrap_or_default();
    DivisionCategory::from_parts(category, parts.next(), parts.next())
}

/// Categorize a division by its name
pub fn categorize(name: &str) -> DivisionCategory {
    let name = name.trim();

    if name.is_empty() {
        debug!("Blank division name");
        return DivisionCategory::from_parts(BILLS_AND_AMENDMENTS, None, None);
    }

    if name.starts_with(COMMITTEES) {
        for pattern in committee_patterns() {
            if let Some(caps) = pattern.captures(name) {
                return DivisionCategory::from_parts(
                    &caps["cat"],
                    caps.name("sub").map(|m| m.as_str()),
                    caps.name("subsub").map(|m| m.as_str()),
                );
            }
        }
        debug!(name, "Committee division without a sub-subcategory");
        return split_on_delimiter(name);
    }

    if SPLIT_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return split_on_delimiter(name);
    }

    match name.split_once(DELIMITER) {
        Some((title, stage)) => DivisionCategory::from_parts(BILLS_AND_AMENDMENTS, Some(title), Some(stage)),
        None => {
            debug!(name, "Division name has no stage delimiter");
            DivisionCategory::from_parts(BILLS_AND_AMENDMENTS, Some(name), None)
        }
    }
}
