use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::indexes::index_by_name;
use crate::store::{Document, DocumentStore, doc_id};
use crate::{Filter, Result, StoreError};

/// PostgreSQL-backed document store.
///
/// All collections share one JSONB `documents` table; the unique indexes
/// declared in [`crate::indexes`] exist as partial expression indexes, so
/// racing writers are stopped by the database rather than by service-level
/// existence checks.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;
        tracing::info!("connected to the document database");
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        let body: serde_json::Value = row.try_get("body")?;
        match body {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(StoreError::MalformedId {
                collection: "<non-object body>".to_string(),
            }),
        }
    }
}

/// Maps a unique-constraint violation back to the declared index it broke.
fn map_db_err(collection: &'static str, e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("documents_pkey") => {
                return StoreError::DuplicateKey {
                    collection,
                    fields: "id".to_string(),
                };
            }
            Some(name) => {
                if let Some(index) = index_by_name(name) {
                    return StoreError::DuplicateKey {
                        collection,
                        fields: index.field_list(),
                    };
                }
            }
            None => {}
        }
    }
    StoreError::Database(e)
}

/// A value bound into a rendered filter.
enum Bind {
    Text(String),
    TextArray(Vec<String>),
}

fn value_as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn looks_like_timestamp(value: &serde_json::Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
}

/// Renders a filter to a SQL fragment over `body`, collecting bind values.
///
/// Placeholder numbering starts after the fixed `collection = $1` bind.
fn render_filter(filter: &Filter, sql: &mut String, binds: &mut Vec<Bind>) {
    let next = |binds: &Vec<Bind>| binds.len() + 2;
    match filter {
        Filter::All => sql.push_str("TRUE"),
        Filter::Eq(field, value) => {
            sql.push_str(&format!("body->>'{field}' = ${}", next(binds)));
            binds.push(Bind::Text(value_as_text(value)));
        }
        Filter::Ne(field, value) => {
            sql.push_str(&format!(
                "body->>'{field}' IS DISTINCT FROM ${}",
                next(binds)
            ));
            binds.push(Bind::Text(value_as_text(value)));
        }
        Filter::In(field, values) => {
            sql.push_str(&format!("body->>'{field}' = ANY(${})", next(binds)));
            binds.push(Bind::TextArray(values.iter().map(value_as_text).collect()));
        }
        Filter::Lte(field, value) => {
            let n = next(binds);
            if looks_like_timestamp(value) {
                sql.push_str(&format!(
                    "(body->>'{field}')::timestamptz <= (${n})::timestamptz"
                ));
            } else if value.is_number() {
                sql.push_str(&format!("(body->>'{field}')::numeric <= (${n})::numeric"));
            } else {
                sql.push_str(&format!("body->>'{field}' <= ${n}"));
            }
            binds.push(Bind::Text(value_as_text(value)));
        }
        Filter::And(filters) => {
            if filters.is_empty() {
                sql.push_str("TRUE");
                return;
            }
            for (i, f) in filters.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" AND ");
                }
                sql.push('(');
                render_filter(f, sql, binds);
                sql.push(')');
            }
        }
    }
}

fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    binds: Vec<Bind>,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for bind in binds {
        query = match bind {
            Bind::Text(s) => query.bind(s),
            Bind::TextArray(v) => query.bind(v),
        };
    }
    query
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, collection: &'static str, doc: Document) -> Result<()> {
        let id = doc_id(collection, &doc)?;

        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(serde_json::Value::Object(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(collection, e))?;

        tracing::debug!(collection, %id, "document inserted");
        metrics::counter!("store_documents_inserted").increment(1);
        Ok(())
    }

    async fn replace(&self, collection: &'static str, doc: Document) -> Result<()> {
        let id = doc_id(collection, &doc)?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(serde_json::Value::Object(doc))
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_err(collection, e))?;

        Ok(())
    }

    async fn find_by_id(&self, collection: &'static str, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn exists(&self, collection: &'static str, id: Uuid) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn find(&self, collection: &'static str, filter: Filter) -> Result<Vec<Document>> {
        let mut predicate = String::new();
        let mut binds = Vec::new();
        render_filter(&filter, &mut predicate, &mut binds);

        let sql = format!("SELECT body FROM documents WHERE collection = $1 AND ({predicate})");
        let query = bind_all(sqlx::query(&sql).bind(collection), binds);

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn count(&self, collection: &'static str, filter: Filter) -> Result<u64> {
        let mut predicate = String::new();
        let mut binds = Vec::new();
        render_filter(&filter, &mut predicate, &mut binds);

        let sql =
            format!("SELECT COUNT(*) FROM documents WHERE collection = $1 AND ({predicate})");
        let query = bind_all(sqlx::query(&sql).bind(collection), binds);

        let row = query.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(filter: Filter) -> (String, usize) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        render_filter(&filter, &mut sql, &mut binds);
        (sql, binds.len())
    }

    #[test]
    fn renders_eq() {
        let (sql, binds) = rendered(Filter::eq("status", "PENDING"));
        assert_eq!(sql, "body->>'status' = $2");
        assert_eq!(binds, 1);
    }

    #[test]
    fn renders_in_as_any() {
        let (sql, binds) = rendered(Filter::In(
            "status".into(),
            vec![json!("PENDING"), json!("IN_PROGRESS")],
        ));
        assert_eq!(sql, "body->>'status' = ANY($2)");
        assert_eq!(binds, 1);
    }

    #[test]
    fn renders_timestamp_lte_with_cast() {
        let (sql, _) = rendered(Filter::Lte(
            "pending_until".into(),
            json!("2026-08-29T10:00:00Z"),
        ));
        assert!(sql.contains("::timestamptz"));
    }

    #[test]
    fn renders_and_with_sequential_placeholders() {
        let (sql, binds) = rendered(Filter::And(vec![
            Filter::eq("user_profile_id", "p"),
            Filter::eq("event_id", "e"),
        ]));
        assert_eq!(sql, "(body->>'user_profile_id' = $2) AND (body->>'event_id' = $3)");
        assert_eq!(binds, 2);
    }

    #[test]
    fn renders_empty_and_as_true() {
        let (sql, binds) = rendered(Filter::And(vec![]));
        assert_eq!(sql, "TRUE");
        assert_eq!(binds, 0);
    }
}
