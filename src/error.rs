//! Error types shared by the database layer and the insertion strategies.

use thiserror::Error;

/// Errors surfaced by street operations.
///
/// Database errors pass through unchanged; nothing here retries.
#[derive(Debug, Error)]
pub enum StreetError {
    /// A non-positive id was used to look up a street.
    #[error("invalid street id {0}: id must be greater than zero")]
    InvalidId(i64),

    /// No street with this id exists (or the update matched no rows).
    #[error("street {0} not found")]
    NotFound(i64),

    /// A street snapshot or input could not be accepted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The configured insertion strategy was not wired up.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    /// The stored geometry column could not be (de)serialized.
    #[error("geometry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StreetError>;
