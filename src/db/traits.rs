//! Document store abstraction
//!
//! This module provides the `DocumentStore` trait that abstracts over the
//! storage backends (in-memory, local SQLite file, remote libsql/Turso).
//! Records are JSON objects grouped into named collections and addressed by
//! [`RecordId`].
//!
//! Soft deletion is a store concern: every read, count, update and delete
//! ignores documents that were soft-deleted. Callers never filter on a
//! deletion flag themselves.
//!
//! # Example
//!
//! ```rust,ignore
//! use sipamit::db::{DatabaseProvider, Filter};
//!
//! let store = DatabaseProvider::Memory.create_store().await?;
//! let admins = store.count("users", &Filter::new().eq("role", "admin")).await?;
//! ```

use crate::types::{RecordId, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Case-insensitive substring condition on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub field: String,
    /// Already lower-cased needle
    pub needle: String,
}

/// Conditions a document must satisfy, joined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub equals: Vec<(String, Value)>,
    pub contains: Option<TextMatch>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// Adds a case-insensitive substring condition.
    pub fn contains(mut self, field: impl Into<String>, needle: &str) -> Self {
        self.contains = Some(TextMatch {
            field: field.into(),
            needle: needle.to_lowercase(),
        });
        self
    }

    /// Returns true when `doc` satisfies every condition.
    pub fn matches(&self, doc: &Document) -> bool {
        let equals_ok = self
            .equals
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected));

        let contains_ok = match &self.contains {
            None => true,
            Some(m) => doc
                .get(&m.field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&m.needle)),
        };

        equals_ok && contains_ok
    }
}

/// Ordering of list results by record id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// A filtered, sorted window over a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub filter: Filter,
    pub skip: u64,
    pub limit: u64,
    pub sort: SortDirection,
}

impl StoreQuery {
    /// Every matching document in ascending id order.
    pub fn all(filter: Filter) -> Self {
        Self {
            filter,
            skip: 0,
            limit: u64::MAX,
            sort: SortDirection::Ascending,
        }
    }
}

/// Abstract document store
///
/// Implementations must be thread-safe (Send + Sync) so a single handle can be
/// shared by all request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document. Fails if the id is already taken.
    async fn insert(&self, collection: &str, id: RecordId, body: Document) -> Result<()>;

    /// Fetches a live document by id.
    async fn get(&self, collection: &str, id: RecordId) -> Result<Option<Document>>;

    /// Fetches the first live document (by id order) matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    /// Runs a windowed query over live documents.
    async fn find(&self, collection: &str, query: &StoreQuery) -> Result<Vec<Document>>;

    /// Counts live documents matching `filter`.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Replaces a live document. Returns false when there is none.
    async fn update(&self, collection: &str, id: RecordId, body: Document) -> Result<bool>;

    /// Marks a live document deleted. Returns false when there is none.
    async fn soft_delete(&self, collection: &str, id: RecordId) -> Result<bool>;
}

/// Storage backend selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// Process-local store (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote libsql/Turso database
    Turso {
        /// The database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Picks a backend from a `DATABASE_URL` value.
    ///
    /// `:memory:` (or an empty string) selects the in-memory store, `libsql://`
    /// and `https://` URLs select a remote database, anything else is treated
    /// as a SQLite file path.
    pub fn from_url(url: &str, auth_token: Option<&str>) -> Self {
        let url = url.trim();
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else if url.starts_with("libsql://") || url.starts_with("https://") {
            DatabaseProvider::Turso {
                url: url.to_string(),
                auth_token: auth_token.unwrap_or_default().to_string(),
            }
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }

    /// Create a store from this provider configuration
    pub async fn create_store(&self) -> Result<Arc<dyn DocumentStore>> {
        match self {
            DatabaseProvider::Memory => Ok(Arc::new(super::memory::MemoryStore::new())),
            DatabaseProvider::SQLite { path } => {
                let store = super::sqlite::SqliteStore::new_local(path).await?;
                Ok(Arc::new(store))
            }
            DatabaseProvider::Turso { url, auth_token } => {
                let store =
                    super::sqlite::SqliteStore::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::new().matches(&doc(json!({}))));
        assert!(Filter::new().matches(&doc(json!({"nama": "x"}))));
    }

    #[test]
    fn test_equality_conditions() {
        let filter = Filter::new().eq("device", "cctv").eq("ok", true);

        assert!(filter.matches(&doc(json!({"device": "cctv", "ok": true}))));
        assert!(!filter.matches(&doc(json!({"device": "cctv", "ok": false}))));
        assert!(!filter.matches(&doc(json!({"device": "ups", "ok": true}))));
        assert!(!filter.matches(&doc(json!({"ok": true}))));
    }

    #[test]
    fn test_contains_is_case_insensitive_substring() {
        let filter = Filter::new().contains("nama", "LoBby");

        assert!(filter.matches(&doc(json!({"nama": "Camera Lobby 2"}))));
        assert!(filter.matches(&doc(json!({"nama": "lobby"}))));
        assert!(!filter.matches(&doc(json!({"nama": "Parking"}))));
        assert!(!filter.matches(&doc(json!({"lokasi": "lobby"}))));
        assert!(!filter.matches(&doc(json!({"nama": 7}))));
    }

    #[test]
    fn test_contains_treats_regex_characters_literally() {
        let filter = Filter::new().contains("nama", "a.c");

        assert!(filter.matches(&doc(json!({"nama": "xa.cx"}))));
        assert!(!filter.matches(&doc(json!({"nama": "abc"}))));
    }

    #[test]
    fn test_sort_direction_default() {
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }

    #[test]
    fn test_provider_from_url() {
        assert_eq!(DatabaseProvider::from_url(":memory:", None), DatabaseProvider::Memory);
        assert_eq!(DatabaseProvider::from_url("", None), DatabaseProvider::Memory);
        assert_eq!(
            DatabaseProvider::from_url("./data/sipamit.db", None),
            DatabaseProvider::SQLite {
                path: "./data/sipamit.db".to_string()
            }
        );
        assert_eq!(
            DatabaseProvider::from_url("libsql://inv.turso.io", Some("tok")),
            DatabaseProvider::Turso {
                url: "libsql://inv.turso.io".to_string(),
                auth_token: "tok".to_string()
            }
        );
    }
}
