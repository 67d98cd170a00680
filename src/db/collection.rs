use super::traits::{Document, DocumentStore, Filter, StoreQuery};
use crate::query::{paginate, ListQuery, Paginated, SearchTarget};
use crate::types::{AppError, RecordId, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// A value stored as one document.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> RecordId;
}

/// Typed view over one store collection.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name,
            _record: PhantomData,
        }
    }
}

fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Internal(format!(
            "Record did not serialize to an object: {}",
            other
        ))),
        Err(e) => Err(AppError::Internal(format!("Failed to serialize record: {}", e))),
    }
}

fn from_document<T: DeserializeOwned>(collection: &str, doc: Document) -> Result<T> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| AppError::Database(format!("Malformed document in {}: {}", collection, e)))
}

impl<T: Record> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn insert(&self, record: &T) -> Result<()> {
        self.store
            .insert(self.name, record.id(), to_document(record)?)
            .await
    }

    pub async fn get(&self, id: RecordId) -> Result<Option<T>> {
        self.store
            .get(self.name, id)
            .await?
            .map(|doc| from_document(self.name, doc))
            .transpose()
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>> {
        self.store
            .find_one(self.name, filter)
            .await?
            .map(|doc| from_document(self.name, doc))
            .transpose()
    }

    pub async fn find(&self, query: &StoreQuery) -> Result<Vec<T>> {
        self.store
            .find(self.name, query)
            .await?
            .into_iter()
            .map(|doc| from_document(self.name, doc))
            .collect()
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64> {
        self.store.count(self.name, filter).await
    }

    /// Replaces the stored record. Returns false when it is gone.
    pub async fn update(&self, record: &T) -> Result<bool> {
        self.store
            .update(self.name, record.id(), to_document(record)?)
            .await
    }

    pub async fn soft_delete(&self, id: RecordId) -> Result<bool> {
        self.store.soft_delete(self.name, id).await
    }

    /// Runs a list query and wraps the page in the pagination envelope.
    pub async fn list(&self, query: &ListQuery, target: SearchTarget) -> Result<Paginated<T>> {
        let store_query = query.to_store_query(target);
        let items = self.find(&store_query).await?;
        let total = self.count(&store_query.filter).await?;

        Ok(paginate(items, total, query.page, query.page_size))
    }
}
