use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{Filter, Result, StoreError};

/// A stored document: the JSON-object form of an entity.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Extracts and parses the `id` field of a document.
pub fn doc_id(collection: &str, doc: &Document) -> Result<Uuid> {
    doc.get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StoreError::MalformedId {
            collection: collection.to_string(),
        })
}

/// Core trait for document store backends.
///
/// Operations are synchronous from the caller's perspective and single-
/// document in granularity; the only cross-document guarantee is that the
/// declared unique indexes hold. All implementations must be thread-safe.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the document's id or any
    /// declared unique key already exists in the collection.
    async fn insert(&self, collection: &'static str, doc: Document) -> Result<()>;

    /// Replaces the document with the same id, inserting if absent.
    ///
    /// Unique indexes are re-checked against the new field values.
    async fn replace(&self, collection: &'static str, doc: Document) -> Result<()>;

    /// Fetches a document by id.
    async fn find_by_id(&self, collection: &'static str, id: Uuid) -> Result<Option<Document>>;

    /// Returns true if a document with the given id exists.
    async fn exists(&self, collection: &'static str, id: Uuid) -> Result<bool> {
        Ok(self.find_by_id(collection, id).await?.is_some())
    }

    /// Returns all documents matching the filter, in unspecified order.
    async fn find(&self, collection: &'static str, filter: Filter) -> Result<Vec<Document>>;

    /// Counts documents matching the filter.
    async fn count(&self, collection: &'static str, filter: Filter) -> Result<u64> {
        Ok(self.find(collection, filter).await?.len() as u64)
    }
}

/// A typed entity persisted in a named collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the record lives in.
    const COLLECTION: &'static str;

    /// The record's identifier.
    fn id(&self) -> Uuid;
}

fn to_document<R: Record>(record: &R) -> Result<Document> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(StoreError::MalformedId {
            collection: R::COLLECTION.to_string(),
        }),
    }
}

/// Extension trait with typed convenience methods over [`DocumentStore`].
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Inserts a typed record.
    async fn insert_record<R: Record>(&self, record: &R) -> Result<()> {
        self.insert(R::COLLECTION, to_document(record)?).await
    }

    /// Saves (upserts) a typed record.
    async fn save_record<R: Record>(&self, record: &R) -> Result<()> {
        self.replace(R::COLLECTION, to_document(record)?).await
    }

    /// Fetches a typed record by id.
    async fn get<R: Record>(&self, id: Uuid) -> Result<Option<R>> {
        match self.find_by_id(R::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(serde_json::Value::Object(
                doc,
            ))?)),
            None => Ok(None),
        }
    }

    /// Returns all typed records matching the filter.
    async fn find_records<R: Record>(&self, filter: Filter) -> Result<Vec<R>> {
        self.find(R::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|doc| {
                serde_json::from_value(serde_json::Value::Object(doc)).map_err(StoreError::from)
            })
            .collect()
    }

    /// Returns the first typed record matching the filter, if any.
    async fn find_one<R: Record>(&self, filter: Filter) -> Result<Option<R>> {
        Ok(self.find_records(filter).await?.into_iter().next())
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}
