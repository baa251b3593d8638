//! Participant directory
//!
//! Maps a participant identity to the institution and department they
//! belong to. The directory is owned and populated outside the core; the
//! core only ever reads from it, once per write (the creator) and once per
//! read request (the viewer).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Institution and department a participant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliation {
    pub institution_id: u64,
    pub department_id: u64,
}

/// Read-only identity lookup.
///
/// Implementations must be fast and side-effect free. Unknown identities
/// resolve to `None`; a backend that cannot be reached must also answer
/// `None` so callers fall back to defaults instead of failing.
pub trait Directory: Send + Sync {
    /// Resolve an identity to its affiliation, if known.
    fn resolve(&self, identity: &str) -> Option<Affiliation>;
}

/// One directory entry as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMember {
    /// Participant identity (account address)
    pub identity: String,

    /// Institution the participant belongs to
    pub institution_id: u64,

    /// Department within the institution
    pub department_id: u64,
}

/// In-memory directory built from a fixed member list
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: HashMap<String, Affiliation>,
}

impl StaticDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from configured members. Later entries win on
    /// duplicate identities.
    pub fn from_members(members: &[DirectoryMember]) -> Self {
        let mut directory = Self::new();
        for m in members {
            directory.insert(
                m.identity.clone(),
                Affiliation {
                    institution_id: m.institution_id,
                    department_id: m.department_id,
                },
            );
        }
        directory
    }

    /// Add or replace one member
    pub fn insert(&mut self, identity: impl Into<String>, affiliation: Affiliation) {
        self.members.insert(identity.into(), affiliation);
    }

    /// Number of known members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Directory for StaticDirectory {
    fn resolve(&self, identity: &str) -> Option<Affiliation> {
        self.members.get(identity).copied()
    }
}
