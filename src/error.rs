//! ScholarHub error types

use thiserror::Error;

/// ScholarHub error type
#[derive(Error, Debug)]
pub enum Error {
    /// No visible project with this id.
    ///
    /// Covers both "absent" and "hidden from this viewer" so callers cannot
    /// probe for the existence of records they may not see.
    #[error("Project {0} not found")]
    NotFound(u64),

    /// Record failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Durable storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Summary enrichment failed or timed out
    #[error("Enrichment error: {0}")]
    Enrichment(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for ScholarHub operations
pub type Result<T> = std::result::Result<T, Error>;
