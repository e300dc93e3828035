//! Storage for the `categories` table.
//!
//! [`CategoryTable`] is the set of parameterized statements the repository
//! needs: point lookups, an unbounded scan, inserts with a store-generated key,
//! and updates/deletes by key. [`postgres::Session`] runs them against the
//! database; [`memory::MemoryTable`] keeps rows in process for tests and local
//! runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::Category;

/// Raw failure from the store driver.
///
/// Never leaves the repository; it is classified there.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Statements executed against the single `categories` table.
///
/// Implementations are shared across in-flight requests and must not need
/// external locking.
#[async_trait]
pub trait CategoryTable: Send + Sync {
    /// Every row, in whatever order the store returns them.
    async fn scan(&self) -> StoreResult<Vec<Category>>;

    async fn lookup(&self, id: Uuid) -> StoreResult<Option<Category>>;

    /// Key-only existence check.
    async fn contains(&self, id: Uuid) -> StoreResult<bool>;

    /// Insert a row under a fresh key chosen by the store and return that key.
    async fn insert(&self, name: &str) -> StoreResult<Uuid>;

    async fn update(&self, id: Uuid, name: &str) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}
