//! Project record types
//!
//! Defines the stored project record, its visibility level, and the wire
//! types used by the Projects API. All records use camelCase JSON
//! serialization; the access level is carried as its integer tag.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Visibility of a project, ordered by increasing restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AccessLevel {
    /// Visible to everyone, including anonymous callers
    #[default]
    Public,
    /// Visible to authors and members of the record's institution.
    /// Older records call this level "restricted".
    Institution,
    /// Visible to listed authors only
    Private,
}

impl AccessLevel {
    /// Integer tag used in persisted and wire form
    pub fn tag(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Institution => 1,
            Self::Private => 2,
        }
    }

    /// Decode an integer tag; unknown tags are not representable
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Public),
            1 => Some(Self::Institution),
            2 => Some(Self::Private),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Institution => write!(f, "institution"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "institution" | "restricted" => Ok(Self::Institution),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.tag())
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Tag(u8),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Tag(tag) => Self::from_tag(tag)
                .ok_or_else(|| D::Error::custom(format!("unknown access level tag: {}", tag))),
            Raw::Name(name) => name.parse().map_err(D::Error::custom),
        }
    }
}

/// A published research project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub department_id: u64,
    pub institution_id: u64,
    pub year: i32,
    pub access_level: AccessLevel,
    /// Content identifier of the off-store artifact
    pub artifact_hash: String,
    pub authors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub creator_identity: String,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ProjectRecord {
    /// Whether `identity` is a listed author (exact, case-sensitive match)
    pub fn is_author(&self, identity: &str) -> bool {
        self.authors.iter().any(|a| a == identity)
    }

    /// Check structural invariants before the record is stored.
    ///
    /// Text fields count as empty when they hold only whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(Error::Validation("project id must be positive".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(Error::Validation("description must not be empty".to_string()));
        }
        if self.artifact_hash.trim().is_empty() {
            return Err(Error::Validation("artifact hash must not be empty".to_string()));
        }
        if self.authors.is_empty() {
            return Err(Error::Validation(format!(
                "project {} must have at least one author",
                self.id
            )));
        }
        Ok(())
    }
}

/// Request body for publishing a project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub department_id: u64,
    pub year: i32,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub artifact_hash: Option<String>,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_code("FORBIDDEN", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }
}
