use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{
    project, with_id, Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, InsertOneResult,
    StoreError, UpdateResult, ID_FIELD,
};
use crate::config::DatabaseConfig;

/// PostgreSQL-backed store: one JSONB table per collection.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Opens the shared pool and makes sure every collection table exists.
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Connected to document store at {}", redact(database_url));

        let store = Self { pool };
        store.ensure_collections().await?;
        Ok(store)
    }

    async fn ensure_collections(&self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            let sql = format!(
                r#"CREATE TABLE IF NOT EXISTS "{}" (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"#,
                collection
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Selects the first id matching a filter. Binds: `$1` optional id, `$2` containment object.
fn first_match_sql(collection: Collection) -> String {
    format!(
        r#"SELECT id FROM "{}" WHERE ($1::uuid IS NULL OR id = $1) AND doc @> $2 ORDER BY created_at, id LIMIT 1"#,
        collection
    )
}

fn select_sql(collection: Collection, limit_one: bool) -> String {
    format!(
        r#"SELECT id, doc FROM "{}" WHERE ($1::uuid IS NULL OR id = $1) AND doc @> $2 ORDER BY created_at, id{}"#,
        collection,
        if limit_one { " LIMIT 1" } else { "" }
    )
}

fn update_sql(collection: Collection) -> String {
    format!(
        r#"WITH target AS (
            SELECT id, doc FROM "{table}"
            WHERE ($1::uuid IS NULL OR id = $1) AND doc @> $2
            ORDER BY created_at, id LIMIT 1
            FOR UPDATE
        )
        UPDATE "{table}" AS t SET doc = t.doc || $3
        FROM target WHERE t.id = target.id
        RETURNING target.doc IS DISTINCT FROM t.doc"#,
        table = collection
    )
}

fn delete_sql(collection: Collection) -> String {
    format!(
        r#"DELETE FROM "{}" WHERE id IN ({})"#,
        collection,
        first_match_sql(collection)
    )
}

fn strip_id(mut doc: Document) -> Document {
    doc.remove(ID_FIELD);
    doc
}

/// Drops credentials from a connection URL before it is logged.
fn redact(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut url) => {
            let _ = url.set_password(None);
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<(Uuid, Json<Document>)> = sqlx::query_as(&select_sql(collection, false))
            .bind(filter.id.map(|id| id.as_uuid()))
            .bind(Json(filter.containment()))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(doc))| with_id(id.into(), doc))
            .collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError> {
        let row: Option<(Uuid, Json<Document>)> = sqlx::query_as(&select_sql(collection, true))
            .bind(filter.id.map(|id| id.as_uuid()))
            .bind(Json(filter.containment()))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id, Json(doc))| project(with_id(id.into(), doc), projection)))
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, StoreError> {
        let id = DocumentId::new();
        let sql = format!(r#"INSERT INTO "{}" (id, doc) VALUES ($1, $2)"#, collection);
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(Value::Object(strip_id(doc))))
            .execute(&self.pool)
            .await?;

        Ok(InsertOneResult { acknowledged: true, inserted_id: id })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult, StoreError> {
        let set = strip_id(set);
        let modified: Option<(bool,)> = sqlx::query_as(&update_sql(collection))
            .bind(filter.id.map(|id| id.as_uuid()))
            .bind(Json(filter.containment()))
            .bind(Json(Value::Object(set.clone())))
            .fetch_optional(&self.pool)
            .await?;

        if let Some((changed,)) = modified {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(changed),
                upserted_count: 0,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        }

        let inserted = self.insert_one(collection, set).await?;
        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(inserted.inserted_id),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult, StoreError> {
        let result = sqlx::query(&delete_sql(collection))
            .bind(filter.id.map(|id| id.as_uuid()))
            .bind(Json(filter.containment()))
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
