use super::traits::{Document, DocumentStore, Filter, SortDirection, StoreQuery};
use crate::types::{AppError, RecordId, Result};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{params::Params, Builder, Connection, Database, Value};
use serde_json::Value as JsonValue;

/// Document store backed by a single libsql table.
///
/// Every collection shares the `documents` table; the JSON body is stored as
/// text and queried with `json_extract`. Substring search runs against the
/// `search` column, a copy of the body's string fields lower-cased in Rust,
/// since SQLite's `lower()` only folds ASCII.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Opens (or creates) a local SQLite file.
    pub async fn new_local(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open local database: {}", e)))?;

        let store = Self { db };
        store.initialize_schema().await?;
        Ok(store)
    }

    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        let store = Self { db };
        store.initialize_schema().await?;
        Ok(store)
    }

    fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                search TEXT,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create documents table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_live ON documents(collection, is_deleted, id)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create documents index: {}", e)))?;

        self.migrate_search_column(&conn).await
    }

    /// Adds and backfills `search` on databases created before it existed.
    async fn migrate_search_column(&self, conn: &Connection) -> Result<()> {
        let mut columns = conn
            .query("SELECT name FROM pragma_table_info('documents')", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to inspect documents table: {}", e)))?;

        let mut has_search = false;
        while let Some(row) = columns
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let name: String = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
            has_search |= name == "search";
        }

        if !has_search {
            conn.execute("ALTER TABLE documents ADD COLUMN search TEXT", ())
                .await
                .map_err(|e| AppError::Database(format!("Failed to add search column: {}", e)))?;
        }

        let mut rows = conn
            .query(
                "SELECT collection, id, body FROM documents WHERE search IS NULL",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to scan documents: {}", e)))?;

        let mut pending = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let collection: String = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
            let id: String = row.get(1).map_err(|e| AppError::Database(e.to_string()))?;
            let body: String = row.get(2).map_err(|e| AppError::Database(e.to_string()))?;
            pending.push((collection, id, search_text(&decode_body(&body)?)?));
        }

        if !pending.is_empty() {
            tracing::info!(documents = pending.len(), "backfilling search column");
        }
        for (collection, id, search) in pending {
            conn.execute(
                "UPDATE documents SET search = ? WHERE collection = ? AND id = ?",
                (search, collection, id),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to backfill search: {}", e)))?;
        }

        Ok(())
    }

    async fn query_bodies(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Document>> {
        let conn = self.connection()?;
        let mut rows = conn
            .query(sql, Params::Positional(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to query documents: {}", e)))?;

        let mut documents = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            let body: String = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
            documents.push(decode_body(&body)?);
        }

        Ok(documents)
    }
}

fn decode_body(body: &str) -> Result<Document> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Database(format!("Corrupt document body: {}", e)))
}

fn encode_body(body: &Document) -> Result<String> {
    serde_json::to_string(body)
        .map_err(|e| AppError::Internal(format!("Failed to encode document: {}", e)))
}

/// Lower-cased copy of the body's top-level string fields.
fn search_text(body: &Document) -> Result<String> {
    let folded: Document = body
        .iter()
        .filter_map(|(field, value)| {
            value
                .as_str()
                .map(|s| (field.clone(), JsonValue::String(s.to_lowercase())))
        })
        .collect();
    encode_body(&folded)
}

/// JSON path for a top-level field. Field names are restricted to identifiers.
fn json_path(field: &str) -> Result<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(AppError::Database(format!("Invalid field name: {:?}", field)));
    }
    Ok(format!("$.{}", field))
}

fn sql_value(value: &JsonValue) -> Result<Value> {
    match value {
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Integer(i)),
            None => n
                .as_f64()
                .map(Value::Real)
                .ok_or_else(|| AppError::Database(format!("Unsupported number: {}", n))),
        },
        JsonValue::Null => Ok(Value::Null),
        other => Err(AppError::Database(format!(
            "Unsupported filter value: {}",
            other
        ))),
    }
}

/// Builds the WHERE clause selecting live documents of `collection`.
fn where_clause(collection: &str, filter: &Filter) -> Result<(String, Vec<Value>)> {
    let mut sql = String::from("collection = ? AND is_deleted = 0");
    let mut params = vec![Value::Text(collection.to_string())];

    for (field, value) in &filter.equals {
        sql.push_str(" AND json_extract(body, ?) = ?");
        params.push(Value::Text(json_path(field)?));
        params.push(sql_value(value)?);
    }

    if let Some(m) = &filter.contains {
        let path = json_path(&m.field)?;
        sql.push_str(" AND instr(json_extract(search, ?), ?) > 0");
        params.push(Value::Text(path));
        params.push(Value::Text(m.needle.clone()));
    }

    Ok((sql, params))
}

fn order(sort: SortDirection) -> &'static str {
    match sort {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, collection: &str, id: RecordId, body: Document) -> Result<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO documents (collection, id, body, search, is_deleted, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
            (
                collection,
                id.to_string(),
                encode_body(&body)?,
                search_text(&body)?,
                now,
                now,
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert into {}: {}", collection, e)))?;

        Ok(())
    }

    async fn get(&self, collection: &str, id: RecordId) -> Result<Option<Document>> {
        let mut found = self
            .query_bodies(
                "SELECT body FROM documents WHERE collection = ? AND id = ? AND is_deleted = 0",
                vec![
                    Value::Text(collection.to_string()),
                    Value::Text(id.to_string()),
                ],
            )
            .await?;
        Ok(found.pop())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let (clause, params) = where_clause(collection, filter)?;
        let sql = format!("SELECT body FROM documents WHERE {} ORDER BY id ASC LIMIT 1", clause);

        Ok(self.query_bodies(&sql, params).await?.into_iter().next())
    }

    async fn find(&self, collection: &str, query: &StoreQuery) -> Result<Vec<Document>> {
        let (clause, mut params) = where_clause(collection, &query.filter)?;
        let sql = format!(
            "SELECT body FROM documents WHERE {} ORDER BY id {} LIMIT ? OFFSET ?",
            clause,
            order(query.sort)
        );

        // A negative LIMIT means no limit in SQLite.
        params.push(Value::Integer(i64::try_from(query.limit).unwrap_or(-1)));
        params.push(Value::Integer(i64::try_from(query.skip).unwrap_or(i64::MAX)));

        self.query_bodies(&sql, params).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let (clause, params) = where_clause(collection, filter)?;
        let sql = format!("SELECT COUNT(*) FROM documents WHERE {}", clause);

        let conn = self.connection()?;
        let mut rows = conn
            .query(&sql, Params::Positional(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to count documents: {}", e)))?;

        let count = match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => row
                .get::<i64>(0)
                .map_err(|e| AppError::Database(e.to_string()))?,
            None => 0,
        };

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn update(&self, collection: &str, id: RecordId, body: Document) -> Result<bool> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        let changed = conn
            .execute(
                "UPDATE documents SET body = ?, search = ?, updated_at = ?
                 WHERE collection = ? AND id = ? AND is_deleted = 0",
                (
                    encode_body(&body)?,
                    search_text(&body)?,
                    now,
                    collection,
                    id.to_string(),
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to update {}: {}", collection, e)))?;

        Ok(changed > 0)
    }

    async fn soft_delete(&self, collection: &str, id: RecordId) -> Result<bool> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        let changed = conn
            .execute(
                "UPDATE documents SET is_deleted = 1, updated_at = ?
                 WHERE collection = ? AND id = ? AND is_deleted = 0",
                (now, collection, id.to_string()),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete from {}: {}", collection, e)))?;

        Ok(changed > 0)
    }
}
