use super::collection::{Collection, Record};
use super::traits::{DocumentStore, Filter};
use crate::query::{ListQuery, Paginated, SearchTarget};
use crate::types::{ByAt, RecordId, Result, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const USERS_COLLECTION: &str = "users";

const USER_SEARCH: SearchTarget = SearchTarget::named("full_name");

/// Stored account. Use [`UserProfile`] for anything sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub full_name: String,
    pub username: String,
    /// PHC-formatted Argon2id hash
    pub password: String,
    pub role: Role,
    pub inserted: ByAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<ByAt>,
}

impl Record for User {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Public view of a [`User`], without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub full_name: String,
    pub username: String,
    pub role: Role,
    pub inserted: ByAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<ByAt>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            role: user.role,
            inserted: user.inserted,
            updated: user.updated,
        }
    }
}

/// Lookup used by the request authentication gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user that has not been soft-deleted.
    async fn find_active_by_id(&self, id: RecordId) -> Result<Option<User>>;
}

/// User repository over the document store.
#[derive(Clone)]
pub struct UserRepository {
    users: Collection<User>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Collection::new(store, USERS_COLLECTION),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users
            .find_one(&Filter::new().eq("username", username))
            .await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<User>> {
        self.users.list(query, USER_SEARCH).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.users.count(&Filter::new()).await
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        self.users.insert(user).await
    }

    pub async fn update(&self, user: &User) -> Result<bool> {
        self.users.update(user).await
    }

    pub async fn soft_delete(&self, id: RecordId) -> Result<bool> {
        self.users.soft_delete(id).await
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_active_by_id(&self, id: RecordId) -> Result<Option<User>> {
        self.users.get(id).await
    }
}
