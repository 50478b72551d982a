//! Tag classification for shipment rows.
//!
//! A row carries a free-form tag set. Colour and category tags ("MC", "Land",
//! "U", "G", ...) decide which checklist section a card lands in; numeric
//! condition codes and the verification sentinel never do.

use crate::priority::PriorityRanking;
use serde::{Deserialize, Serialize};

/// Precedence of content tags, highest first.
pub const TAG_PRIORITY: [&str; 7] = ["MC", "Land", "U", "G", "B", "R", "W"];

/// Tag marking a package that passed verification.
pub const VERIFIED_SENTINEL: &str = "0_Verified";

/// Tags that never act as a classification.
pub const RESERVED_TAGS: [&str; 8] = ["0", "1", "2", "3", "4", "5", "5+", VERIFIED_SENTINEL];

/// Suffix appended to the label of an unverified row.
pub const NOT_VERIFIED_SUFFIX: &str = "_not_verified";

/// Derived classification of one ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classification {
    /// Content tag, suffixed with [`NOT_VERIFIED_SUFFIX`] when unverified
    pub label: String,
    /// Whether the verification sentinel was present
    pub verified: bool,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

pub fn is_reserved(tag: &str) -> bool {
    RESERVED_TAGS.contains(&tag)
}

/// Classifies tag sets against the fixed priority ranking.
#[derive(Debug, Clone)]
pub struct TagClassifier {
    ranking: PriorityRanking<&'static str>,
}

impl Default for TagClassifier {
    fn default() -> Self {
        Self {
            ranking: PriorityRanking::from(TAG_PRIORITY),
        }
    }
}

impl TagClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a tag set.
    ///
    /// Returns `None` when every tag is reserved; callers report that as a
    /// classification gap.
    pub fn classify<S: AsRef<str>>(&self, tags: &[S]) -> Option<Classification> {
        let tags: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
        let verified = tags.contains(&VERIFIED_SENTINEL);

        let content = self
            .ranking
            .sort(tags)
            .into_iter()
            .find(|tag| !is_reserved(tag))?;

        let label = if verified {
            content.to_string()
        } else {
            format!("{content}{NOT_VERIFIED_SUFFIX}")
        };

        Some(Classification { label, verified })
    }
}

/// Split a ledger tag field on `", "`. Empty fields yield no tags.
pub fn parse_tags(field: &str) -> Vec<String> {
    if field.trim().is_empty() {
        return Vec::new();
    }
    field
        .split(", ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(tags: &[&str]) -> Option<String> {
        TagClassifier::new().classify(tags).map(|c| c.label)
    }

    #[test]
    fn test_verified_content_tag_unmodified() {
        assert_eq!(classify(&["3", "G", "0_Verified"]).as_deref(), Some("G"));
    }

    #[test]
    fn test_unverified_gets_suffix() {
        assert_eq!(classify(&["3", "U"]).as_deref(), Some("U_not_verified"));
    }

    #[test]
    fn test_highest_priority_tag_wins() {
        assert_eq!(classify(&["W", "B", "Land", "0_Verified"]).as_deref(), Some("Land"));
        assert_eq!(classify(&["R", "MC"]).as_deref(), Some("MC_not_verified"));
    }

    #[test]
    fn test_unranked_content_tag_used_when_no_ranked_tag() {
        assert_eq!(classify(&["5+", "Token", "0_Verified"]).as_deref(), Some("Token"));
        assert_eq!(classify(&["Token", "Promo"]).as_deref(), Some("Token_not_verified"));
    }

    #[test]
    fn test_ranked_tag_beats_earlier_unranked_tag() {
        assert_eq!(classify(&["Token", "G"]).as_deref(), Some("G_not_verified"));
    }

    #[test]
    fn test_sentinel_position_irrelevant() {
        let a = classify(&["0_Verified", "G"]);
        let b = classify(&["G", "0_Verified"]);
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("G"));
    }

    #[test]
    fn test_reserved_only_is_gap() {
        assert_eq!(classify(&["0", "1", "2", "3", "4", "5", "5+", "0_Verified"]), None);
        assert_eq!(classify(&["3"]), None);
        assert_eq!(classify(&[]), None);
    }

    #[test]
    fn test_verified_flag() {
        let c = TagClassifier::new().classify(&["G", "0_Verified"]).unwrap();
        assert!(c.verified);
        let c = TagClassifier::new().classify(&["G"]).unwrap();
        assert!(!c.verified);
        assert_eq!(c.to_string(), "G_not_verified");
    }

    #[test]
    fn test_classify_owned_strings() {
        let tags = parse_tags("3, G, 0_Verified");
        let c = TagClassifier::new().classify(&tags).unwrap();
        assert_eq!(c.label, "G");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("3, G, 0_Verified"), vec!["3", "G", "0_Verified"]);
        assert_eq!(parse_tags("U"), vec!["U"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags("   ").is_empty());
    }

    #[test]
    fn test_parse_tags_only_splits_on_comma_space() {
        assert_eq!(parse_tags("5+,G"), vec!["5+,G"]);
    }
}
