use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::indexes::{UniqueIndex, unique_indexes};
use crate::store::{Document, DocumentStore, doc_id};
use crate::{Filter, Result, StoreError};

type Collections = HashMap<&'static str, BTreeMap<Uuid, Document>>;

/// In-memory document store.
///
/// Backs unit tests and standalone runs, and enforces the same unique
/// indexes as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn collection_len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Removes all documents from all collections.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }
}

fn unique_key(index: &UniqueIndex, doc: &Document) -> Vec<serde_json::Value> {
    index
        .fields
        .iter()
        .map(|f| doc.get(*f).cloned().unwrap_or(serde_json::Value::Null))
        .collect()
}

/// Checks the declared unique indexes for `doc` against every other
/// document already in the collection.
fn check_unique(
    collection: &'static str,
    docs: &BTreeMap<Uuid, Document>,
    doc: &Document,
    id: Uuid,
) -> Result<()> {
    for index in unique_indexes().iter().filter(|ix| ix.collection == collection) {
        let key = unique_key(index, doc);
        let clash = docs
            .iter()
            .any(|(other_id, other)| *other_id != id && unique_key(index, other) == key);
        if clash {
            return Err(StoreError::DuplicateKey {
                collection,
                fields: index.field_list(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &'static str, doc: Document) -> Result<()> {
        let id = doc_id(collection, &doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        if docs.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection,
                fields: "id".to_string(),
            });
        }
        check_unique(collection, docs, &doc, id)?;

        docs.insert(id, doc);
        tracing::debug!(collection, %id, "document inserted");
        metrics::counter!("store_documents_inserted").increment(1);
        Ok(())
    }

    async fn replace(&self, collection: &'static str, doc: Document) -> Result<()> {
        let id = doc_id(collection, &doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        check_unique(collection, docs, &doc, id)?;
        docs.insert(id, doc);
        Ok(())
    }

    async fn find_by_id(&self, collection: &'static str, id: Uuid) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .cloned())
    }

    async fn find(&self, collection: &'static str, filter: Filter) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
