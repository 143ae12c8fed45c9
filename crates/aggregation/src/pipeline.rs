//! Pipeline construction and interpretation.

use std::pin::Pin;

use doc_store::{Document, DocumentStore, Filter, compare_values, resolve_path};
use futures_core::Stream;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::stage::{ProjectField, Stage};
use crate::{AggregationError, Result};

/// A lazy, finite, non-restartable sequence of projected rows.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Document>> + Send>>;

/// A declarative multi-stage query over the document store.
///
/// Built once per read-model query and interpreted by [`Pipeline::run`].
/// An empty matching set yields an empty stream, never an error.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: &'static str,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Starts a pipeline over the given source collection.
    pub fn collection(source: &'static str) -> Self {
        Self {
            source,
            stages: Vec::new(),
        }
    }

    /// Appends a match stage.
    pub fn match_on(mut self, filter: Filter) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    /// Appends a foreign-key coercion stage.
    pub fn coerce_id(mut self, field: impl Into<String>) -> Self {
        self.stages.push(Stage::CoerceId {
            field: field.into(),
        });
        self
    }

    /// Appends a lookup (left join) stage.
    pub fn lookup(
        mut self,
        from: &'static str,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        self.stages.push(Stage::Lookup {
            from,
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        });
        self
    }

    /// Appends an unwind (flatten) stage.
    pub fn unwind(mut self, field: impl Into<String>) -> Self {
        self.stages.push(Stage::Unwind {
            field: field.into(),
        });
        self
    }

    /// Appends a projection stage.
    pub fn project(mut self, fields: Vec<ProjectField>) -> Self {
        self.stages.push(Stage::Project(fields));
        self
    }

    /// Appends a descending sort stage.
    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.stages.push(Stage::SortDesc {
            field: field.into(),
        });
        self
    }

    /// Returns the stage list (for inspection/tests).
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Interprets the pipeline against the store.
    #[tracing::instrument(skip(self, store), fields(source = self.source))]
    pub async fn run<S: DocumentStore>(&self, store: &S) -> Result<DocumentStream> {
        let rows = self.execute(store).await?;
        metrics::counter!("aggregation_rows_emitted").increment(rows.len() as u64);
        Ok(Box::pin(futures_util::stream::iter(
            rows.into_iter().map(Ok),
        )))
    }

    /// Runs the pipeline and deserializes each projected row into `T`.
    pub async fn run_typed<S, T>(&self, store: &S) -> Result<Vec<T>>
    where
        S: DocumentStore,
        T: DeserializeOwned,
    {
        self.execute(store)
            .await?
            .into_iter()
            .map(|row| {
                serde_json::from_value(serde_json::Value::Object(row))
                    .map_err(AggregationError::from)
            })
            .collect()
    }

    async fn execute<S: DocumentStore>(&self, store: &S) -> Result<Vec<Document>> {
        // The leading match is pushed down into the store query; everything
        // after it runs over the fetched rows.
        let (source_filter, rest) = match self.stages.split_first() {
            Some((Stage::Match(filter), rest)) => (filter.clone(), rest),
            _ => (Filter::All, self.stages.as_slice()),
        };

        let mut rows = store.find(self.source, source_filter).await?;

        for stage in rest {
            rows = apply_stage(store, stage, rows).await?;
            if rows.is_empty() {
                break;
            }
        }

        Ok(rows)
    }
}

async fn apply_stage<S: DocumentStore>(
    store: &S,
    stage: &Stage,
    rows: Vec<Document>,
) -> Result<Vec<Document>> {
    match stage {
        Stage::Match(filter) => Ok(rows.into_iter().filter(|r| filter.matches(r)).collect()),
        Stage::CoerceId { field } => Ok(coerce_ids(rows, field)),
        Stage::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        } => lookup(store, rows, from, local_field, foreign_field, as_field).await,
        Stage::Unwind { field } => Ok(unwind(rows, field)),
        Stage::Project(fields) => Ok(rows.into_iter().map(|r| project(&r, fields)).collect()),
        Stage::SortDesc { field } => {
            let mut rows = rows;
            rows.sort_by(|a, b| {
                let av = resolve_path(a, field).unwrap_or(&serde_json::Value::Null);
                let bv = resolve_path(b, field).unwrap_or(&serde_json::Value::Null);
                compare_values(bv, av)
            });
            Ok(rows)
        }
    }
}

/// Normalizes a string foreign key to canonical UUID form; rows with a
/// missing or malformed key are dropped.
fn coerce_ids(rows: Vec<Document>, field: &str) -> Vec<Document> {
    rows.into_iter()
        .filter_map(|mut row| {
            let id: Uuid = row.get(field)?.as_str()?.parse().ok()?;
            row.insert(field.to_string(), serde_json::Value::String(id.to_string()));
            Some(row)
        })
        .collect()
}

/// Joins each row against `from`, batching the whole key set into a single
/// membership query.
async fn lookup<S: DocumentStore>(
    store: &S,
    mut rows: Vec<Document>,
    from: &'static str,
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
) -> Result<Vec<Document>> {
    let mut keys: Vec<serde_json::Value> = Vec::new();
    for row in &rows {
        if let Some(key) = row.get(local_field)
            && !key.is_null()
            && !keys.contains(key)
        {
            keys.push(key.clone());
        }
    }

    let targets = if keys.is_empty() {
        Vec::new()
    } else {
        store
            .find(from, Filter::In(foreign_field.to_string(), keys))
            .await?
    };

    for row in &mut rows {
        let local = row.get(local_field).cloned();
        let matches: Vec<serde_json::Value> = targets
            .iter()
            .filter(|t| local.as_ref().is_some_and(|l| t.get(foreign_field) == Some(l)))
            .cloned()
            .map(serde_json::Value::Object)
            .collect();
        row.insert(as_field.to_string(), serde_json::Value::Array(matches));
    }

    Ok(rows)
}

/// Flattens the array at `field` to one row per element. Rows whose array
/// is empty or missing are dropped, which makes a preceding lookup behave
/// as an inner join.
fn unwind(rows: Vec<Document>, field: &str) -> Vec<Document> {
    rows.into_iter()
        .flat_map(|row| {
            let items = match row.get(field) {
                Some(serde_json::Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            items
                .into_iter()
                .map(move |item| {
                    let mut flattened = row.clone();
                    flattened.insert(field.to_string(), item);
                    flattened
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn project(row: &Document, fields: &[ProjectField]) -> Document {
    let mut out = Document::new();
    for field in fields {
        let value = resolve_path(row, &field.source)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        out.insert(field.target.clone(), value);
    }
    out
}
