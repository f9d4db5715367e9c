//! Taxonomy codes consulted by the RTU import.
//!
//! The taxonomy store itself is owned elsewhere; the import only reads
//! whole groups and checks membership or labels.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Taxonomy groups read by the RTU import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxonomyGroup {
    /// Administrative areas (boroughs and related cities). Labels are the
    /// district names partners send.
    Area,
    /// Organizations allowed to declare work in the RTU network.
    RtuPartner,
    /// Project statuses known to the RTU network.
    RtuStatus,
}

impl TaxonomyGroup {
    /// Group name as stored in the `taxonomies` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::RtuPartner => "rtuPartner",
            Self::RtuStatus => "rtuStatus",
        }
    }

    /// Parse a group name. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "area" => Some(Self::Area),
            "rtuPartner" => Some(Self::RtuPartner),
            "rtuStatus" => Some(Self::RtuStatus),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaxonomyGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bilingual label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyLabel {
    pub fr: Option<String>,
    pub en: Option<String>,
}

/// One code of a taxonomy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub group: String,
    pub code: String,
    pub label: TaxonomyLabel,
}

impl Taxonomy {
    /// Exact match against either label.
    pub fn has_label(&self, name: &str) -> bool {
        self.label.fr.as_deref() == Some(name) || self.label.en.as_deref() == Some(name)
    }
}

/// Collect the codes of a group into a set for membership checks.
pub fn code_set(taxonomies: &[Taxonomy]) -> HashSet<String> {
    taxonomies.iter().map(|t| t.code.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(code: &str, fr: &str) -> Taxonomy {
        Taxonomy {
            group: TaxonomyGroup::Area.as_str().to_string(),
            code: code.to_string(),
            label: TaxonomyLabel {
                fr: Some(fr.to_string()),
                en: None,
            },
        }
    }

    #[test]
    fn group_names_round_trip() {
        for group in [
            TaxonomyGroup::Area,
            TaxonomyGroup::RtuPartner,
            TaxonomyGroup::RtuStatus,
        ] {
            assert_eq!(TaxonomyGroup::from_str(group.as_str()), Some(group));
        }
        assert!(TaxonomyGroup::from_str("borough").is_none());
    }

    #[test]
    fn label_match_is_exact() {
        let vm = area("VM", "Ville-Marie");
        assert!(vm.has_label("Ville-Marie"));
        assert!(!vm.has_label("ville-marie"));
        assert!(!vm.has_label("Ville-Marie "));
    }

    #[test]
    fn code_set_collects_codes() {
        let set = code_set(&[area("VM", "Ville-Marie"), area("SO", "Le Sud-Ouest")]);
        assert!(set.contains("VM") && set.contains("SO"));
        assert_eq!(set.len(), 2);
    }
}
