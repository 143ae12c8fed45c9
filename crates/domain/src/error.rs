//! Domain error taxonomy.

use doc_store::StoreError;
use thiserror::Error;

/// Errors raised by the domain services.
///
/// The API layer maps these to HTTP statuses; services themselves never
/// deal in status codes.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness invariant was violated (duplicate email, group name,
    /// or order for the same user/event pair).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller lacks rights over the resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed input: missing required field or out-of-range value.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A store operation failed for reasons other than a unique key.
    #[error("store error: {0}")]
    Store(StoreError),

    /// An aggregation pipeline failed.
    #[error("aggregation error: {0}")]
    Aggregation(#[from] aggregation::AggregationError),
}

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        // Unique-index violations are the storage layer catching a race
        // the service-level existence check missed; both are conflicts.
        match e {
            StoreError::DuplicateKey { collection, fields } => {
                DomainError::Conflict(format!("duplicate key in '{collection}' on ({fields})"))
            }
            other => DomainError::Store(other),
        }
    }
}
