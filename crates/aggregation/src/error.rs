//! Aggregation error types.

use thiserror::Error;

/// Errors that can occur while running a pipeline.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// An error occurred in the document store.
    #[error("store error: {0}")]
    Store(#[from] doc_store::StoreError),

    /// Failed to deserialize a projected row into its typed shape.
    #[error("row deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregationError>;
