//! Document persistence gateway.
//!
//! Entities are stored as JSON documents in named collections. The
//! [`DocumentStore`] trait abstracts the backend; [`InMemoryDocumentStore`]
//! backs unit tests and standalone runs, [`PostgresDocumentStore`] persists
//! documents in a JSONB table. Uniqueness constraints are declared once in
//! [`indexes`] and enforced by every backend, so a duplicate write surfaces
//! as [`StoreError::DuplicateKey`] regardless of which backend raced.

pub mod error;
pub mod filter;
pub mod indexes;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use filter::{Filter, compare_values, resolve_path};
pub use indexes::{UniqueIndex, unique_indexes};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use store::{Document, DocumentStore, DocumentStoreExt, Record, doc_id};
