use super::traits::{Document, DocumentStore, Filter, SortDirection, StoreQuery};
use crate::types::{AppError, RecordId, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct Entry {
    body: Document,
    deleted: bool,
}

/// In-process document store.
///
/// Collections are ordered maps keyed by [`RecordId`], so iteration order is
/// id order. Used for tests and for `DATABASE_URL=:memory:`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<RecordId, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching<'a>(
        entries: &'a BTreeMap<RecordId, Entry>,
        filter: &'a Filter,
        sort: SortDirection,
    ) -> Box<dyn Iterator<Item = &'a Entry> + 'a> {
        let ordered: Box<dyn Iterator<Item = &Entry>> = match sort {
            SortDirection::Ascending => Box::new(entries.values()),
            SortDirection::Descending => Box::new(entries.values().rev()),
        };
        Box::new(ordered.filter(move |e| !e.deleted && filter.matches(&e.body)))
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: RecordId, body: Document) -> Result<()> {
        let mut collections = self.collections.write();
        let entries = collections.entry(collection.to_string()).or_default();

        if entries.contains_key(&id) {
            return Err(AppError::Database(format!(
                "Duplicate id {} in {}",
                id, collection
            )));
        }

        entries.insert(
            id,
            Entry {
                body,
                deleted: false,
            },
        );
        Ok(())
    }

    async fn get(&self, collection: &str, id: RecordId) -> Result<Option<Document>> {
        let collections = self.collections.read();
        let found = collections
            .get(collection)
            .and_then(|entries| entries.get(&id))
            .filter(|e| !e.deleted)
            .map(|e| e.body.clone());
        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read();
        let Some(entries) = collections.get(collection) else {
            return Ok(None);
        };

        let found = Self::matching(entries, filter, SortDirection::Ascending)
            .next()
            .map(|e| e.body.clone());
        Ok(found)
    }

    async fn find(&self, collection: &str, query: &StoreQuery) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let page = Self::matching(entries, &query.filter, query.sort)
            .skip(to_usize(query.skip))
            .take(to_usize(query.limit))
            .map(|e| e.body.clone())
            .collect();
        Ok(page)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read();
        let Some(entries) = collections.get(collection) else {
            return Ok(0);
        };

        let count = Self::matching(entries, filter, SortDirection::Ascending).count();
        Ok(count as u64)
    }

    async fn update(&self, collection: &str, id: RecordId, body: Document) -> Result<bool> {
        let mut collections = self.collections.write();
        match collections
            .get_mut(collection)
            .and_then(|entries| entries.get_mut(&id))
        {
            Some(entry) if !entry.deleted => {
                entry.body = body;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, collection: &str, id: RecordId) -> Result<bool> {
        let mut collections = self.collections.write();
        match collections
            .get_mut(collection)
            .and_then(|entries| entries.get_mut(&id))
        {
            Some(entry) if !entry.deleted => {
                entry.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(name: &str) -> Document {
        let mut doc = Document::new();
        doc.insert("nama".to_string(), json!(name));
        doc
    }

    #[tokio::test]
    async fn test_reads_release_the_lock() {
        let store = MemoryStore::new();
        for name in ["CCTV Lobby", "CCTV Gerbang", "TOA Lobby"] {
            store.insert("docs", RecordId::new(), body(name)).await.unwrap();
        }
        let lobby = Filter::new().contains("nama", "lobby");

        let first = store.find_one("docs", &lobby).await.unwrap().expect("match");
        assert_eq!(first.get("nama"), Some(&json!("CCTV Lobby")));
        assert_eq!(store.count("docs", &lobby).await.unwrap(), 2);

        let newest = StoreQuery {
            filter: lobby,
            skip: 0,
            limit: 1,
            sort: SortDirection::Descending,
        };
        let page = store.find("docs", &newest).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].get("nama"), Some(&json!("TOA Lobby")));

        // A writer must not deadlock after the reads above.
        store.insert("docs", RecordId::new(), body("UPS")).await.unwrap();
        assert_eq!(store.count("docs", &Filter::new()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let query = StoreQuery::all(Filter::new());

        assert!(store.find_one("nope", &Filter::new()).await.unwrap().is_none());
        assert!(store.find("nope", &query).await.unwrap().is_empty());
        assert_eq!(store.count("nope", &Filter::new()).await.unwrap(), 0);
    }
}
