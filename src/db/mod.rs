//! Document storage.
//!
//! This module provides the storage layer behind the inventory API:
//! - **`DocumentStore`**: async trait over JSON document collections with
//!   soft deletion built in
//! - **Backends**: in-memory ([`MemoryStore`]) and libsql/SQLite ([`SqliteStore`]),
//!   selected through [`DatabaseProvider`]
//! - **Typed access**: [`Collection`] maps records to documents with serde
//!
//! # Example
//!
//! ```rust,ignore
//! use sipamit::db::{Collection, DatabaseProvider};
//! use sipamit::inventory::{Device, DeviceKind};
//!
//! let store = DatabaseProvider::from_url("./data/sipamit.db", None).create_store().await?;
//! let cctvs: Collection<Device> = Collection::new(store, DeviceKind::Cctv.collection());
//! ```

pub mod checklists;
pub mod collection;
pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod users;

pub use checklists::ChecklistRepository;
pub use collection::{Collection, Record};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{
    DatabaseProvider, Document, DocumentStore, Filter, SortDirection, StoreQuery, TextMatch,
};
pub use users::{User, UserDirectory, UserProfile, UserRepository};
