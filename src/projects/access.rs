//! Project visibility rules
//!
//! Decides whether a viewer may see a project. Evaluated once per record on
//! every read path, so it must stay pure: no I/O, no clock, no randomness.
//!
//! Rules, first match wins:
//! 1. `Public` records are visible to everyone, anonymous callers included.
//! 2. A listed author always sees the record, whatever its level.
//! 3. `Institution` records are visible to viewers whose resolved
//!    institution matches the record's.
//! 4. Everything else is hidden.

use super::types::{AccessLevel, ProjectRecord};
use crate::directory::Affiliation;

/// Whether `viewer` (with its resolved `affiliation`) may see `record`.
///
/// An absent viewer only ever sees `Public` records. An affiliation without
/// an identity is ignored.
pub fn can_view(
    record: &ProjectRecord,
    viewer: Option<&str>,
    affiliation: Option<&Affiliation>,
) -> bool {
    if record.access_level == AccessLevel::Public {
        return true;
    }

    let Some(viewer) = viewer else {
        return false;
    };

    if record.is_author(viewer) {
        return true;
    }

    match (record.access_level, affiliation) {
        (AccessLevel::Institution, Some(aff)) => aff.institution_id == record.institution_id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const LEVELS: [AccessLevel; 3] = [
        AccessLevel::Public,
        AccessLevel::Institution,
        AccessLevel::Private,
    ];

    fn record(level: AccessLevel, institution_id: u64, authors: &[&str]) -> ProjectRecord {
        ProjectRecord {
            id: 1,
            title: "T".to_string(),
            description: "D".to_string(),
            department_id: 1,
            institution_id,
            year: 2024,
            access_level: level,
            artifact_hash: "QmHash".to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            created_at: Utc::now(),
            creator_identity: authors[0].to_string(),
            summary: None,
        }
    }

    fn aff(institution_id: u64) -> Affiliation {
        Affiliation {
            institution_id,
            department_id: 1,
        }
    }

    #[test]
    fn test_public_visible_to_anyone() {
        let r = record(AccessLevel::Public, 1, &["0xAAA"]);
        assert!(can_view(&r, None, None));
        assert!(can_view(&r, Some("0xBBB"), None));
        assert!(can_view(&r, Some("0xBBB"), Some(&aff(2))));
        assert!(can_view(&r, None, Some(&aff(2))));
    }

    #[test]
    fn test_authors_always_see_their_records() {
        for level in LEVELS {
            let r = record(level, 1, &["0xAAA", "0xCCC"]);
            assert!(can_view(&r, Some("0xAAA"), None));
            assert!(can_view(&r, Some("0xCCC"), Some(&aff(7))));
        }
    }

    #[test]
    fn test_private_hidden_from_non_authors() {
        let r = record(AccessLevel::Private, 1, &["0xAAA"]);
        assert!(!can_view(&r, None, None));
        assert!(!can_view(&r, Some("0xBBB"), None));
        // Same institution does not open a private record
        assert!(!can_view(&r, Some("0xBBB"), Some(&aff(1))));
    }

    #[test]
    fn test_institution_requires_matching_affiliation() {
        let r = record(AccessLevel::Institution, 1, &["0xAAA"]);
        assert!(can_view(&r, Some("0xBBB"), Some(&aff(1))));
        assert!(!can_view(&r, Some("0xBBB"), Some(&aff(2))));
        assert!(!can_view(&r, Some("0xBBB"), None));
    }

    #[test]
    fn test_anonymous_affiliation_is_ignored() {
        let r = record(AccessLevel::Institution, 1, &["0xAAA"]);
        assert!(!can_view(&r, None, Some(&aff(1))));
    }

    #[test]
    fn test_author_match_is_case_sensitive() {
        let r = record(AccessLevel::Private, 1, &["0xAbC"]);
        assert!(can_view(&r, Some("0xAbC"), None));
        assert!(!can_view(&r, Some("0xabc"), None));
    }

    #[test]
    fn test_institution_rule_matches_definition() {
        let viewers = [None, Some("0xAAA"), Some("0xBBB")];
        let affiliations = [None, Some(aff(1)), Some(aff(2))];
        let r = record(AccessLevel::Institution, 1, &["0xAAA"]);

        for viewer in viewers {
            for a in affiliations.iter() {
                let expected = match viewer {
                    None => false,
                    Some(v) => {
                        r.is_author(v) || a.map(|a| a.institution_id == 1).unwrap_or(false)
                    }
                };
                assert_eq!(can_view(&r, viewer, a.as_ref()), expected);
            }
        }
    }

    #[test]
    fn test_decision_is_repeatable() {
        let r = record(AccessLevel::Institution, 3, &["0xAAA"]);
        let first = can_view(&r, Some("0xBBB"), Some(&aff(3)));
        for _ in 0..10 {
            assert_eq!(can_view(&r, Some("0xBBB"), Some(&aff(3))), first);
        }
    }
}
