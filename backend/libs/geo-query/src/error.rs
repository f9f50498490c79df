//! Error types for geo queries.

use thiserror::Error;

/// Result type alias for geo query operations.
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors surfaced by the query engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// Coordinates, radius, limit or payload rejected before any storage access
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage collaborator failed; the whole query is aborted
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl GeoError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        GeoError::InvalidArgument(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        GeoError::StorageUnavailable(msg.into())
    }
}
