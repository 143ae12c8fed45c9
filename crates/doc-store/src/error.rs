use thiserror::Error;

/// Errors that can occur when interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated a declared unique index.
    #[error("duplicate key in '{collection}' on ({fields})")]
    DuplicateKey {
        collection: &'static str,
        fields: String,
    },

    /// The document is missing its `id` field or it is not a UUID.
    #[error("document in '{collection}' has a missing or malformed id")]
    MalformedId { collection: String },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
