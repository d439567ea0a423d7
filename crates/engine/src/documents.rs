//! Document store backends.
//!
//! Records live in named collections and are addressed by id. Writes use
//! merge-upsert semantics: fields not named in a write are preserved, and a
//! write may ask the store to stamp one field with its own clock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tokio::sync::RwLock;

use telechat_common::error::AppError;

/// A JSON document store with point reads and merge-upserts.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    /// Merge `fields` into the document, creating it if needed.
    ///
    /// When `server_timestamp` names a field, that field is set to the
    /// store's current time.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        server_timestamp: Option<&str>,
    ) -> Result<(), AppError>;
}

/// PostgreSQL-backed store over the `documents` table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(data,)| data))
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        server_timestamp: Option<&str>,
    ) -> Result<(), AppError> {
        let data = Value::Object(fields);

        match server_timestamp {
            Some(field) => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, data, updated_at)
                    VALUES ($1, $2, $3::jsonb || jsonb_build_object($4::text, to_jsonb(NOW())), NOW())
                    ON CONFLICT (collection, id) DO UPDATE
                    SET data = documents.data || EXCLUDED.data, updated_at = NOW()
                    "#,
                )
                .bind(collection)
                .bind(id)
                .bind(&data)
                .bind(field)
                .execute(&self.pool)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO documents (collection, id, data, updated_at)
                    VALUES ($1, $2, $3::jsonb, NOW())
                    ON CONFLICT (collection, id) DO UPDATE
                    SET data = documents.data || EXCLUDED.data, updated_at = NOW()
                    "#,
                )
                .bind(collection)
                .bind(id)
                .bind(&data)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }
}

/// In-process store, used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: RwLock<HashMap<(String, String), Map<String, Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a document wholesale. Non-object values are stored as empty documents.
    pub async fn put(&self, collection: &str, id: &str, data: Value) {
        let fields = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.docs
            .write()
            .await
            .insert((collection.to_string(), id.to_string()), fields);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let docs = self.docs.read().await;
        Ok(docs
            .get(&(collection.to_string(), id.to_string()))
            .map(|fields| Value::Object(fields.clone())))
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        server_timestamp: Option<&str>,
    ) -> Result<(), AppError> {
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry((collection.to_string(), id.to_string()))
            .or_default();

        doc.extend(fields);
        if let Some(field) = server_timestamp {
            doc.insert(field.to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        Ok(())
    }
}
