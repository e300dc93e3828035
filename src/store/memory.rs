//! In-process [`CategoryTable`].
//!
//! Rows keep insertion order. `update` is an upsert, matching column-store
//! write semantics: updating a missing key writes a new row. Failures can be
//! injected per statement kind to exercise error classification.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{CategoryTable, StoreError, StoreResult};
use crate::model::Category;

/// Statement kinds, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOp {
    Scan,
    Lookup,
    Contains,
    Insert,
    Update,
    Delete,
}

impl TableOp {
    const ALL: [TableOp; 6] = [
        TableOp::Scan,
        TableOp::Lookup,
        TableOp::Contains,
        TableOp::Insert,
        TableOp::Update,
        TableOp::Delete,
    ];
}

#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: RwLock<Vec<Category>>,
    failing: RwLock<HashSet<TableOp>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table whose every statement fails.
    pub fn unavailable() -> Self {
        let table = Self::new();
        for op in TableOp::ALL {
            table.fail_on(op);
        }
        table
    }

    /// Make every later statement of kind `op` fail.
    pub fn fail_on(&self, op: TableOp) {
        self.failing.write().insert(op);
    }

    pub fn recover(&self, op: TableOp) {
        self.failing.write().remove(&op);
    }

    /// Snapshot of the stored rows, bypassing failure injection.
    pub fn rows(&self) -> Vec<Category> {
        self.rows.read().clone()
    }

    fn check(&self, op: TableOp) -> StoreResult<()> {
        if self.failing.read().contains(&op) {
            return Err(StoreError::Unavailable(format!("{:?} rejected", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryTable for MemoryTable {
    async fn scan(&self) -> StoreResult<Vec<Category>> {
        self.check(TableOp::Scan)?;
        Ok(self.rows.read().clone())
    }

    async fn lookup(&self, id: Uuid) -> StoreResult<Option<Category>> {
        self.check(TableOp::Lookup)?;
        Ok(self.rows.read().iter().find(|row| row.id == id).cloned())
    }

    async fn contains(&self, id: Uuid) -> StoreResult<bool> {
        self.check(TableOp::Contains)?;
        Ok(self.rows.read().iter().any(|row| row.id == id))
    }

    async fn insert(&self, name: &str) -> StoreResult<Uuid> {
        self.check(TableOp::Insert)?;
        let id = Uuid::new_v4();
        self.rows.write().push(Category {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn update(&self, id: Uuid, name: &str) -> StoreResult<()> {
        self.check(TableOp::Update)?;
        let mut rows = self.rows.write();
        match rows.iter_mut().find(|row| row.id == id) {
            Some(row) => row.name = name.to_string(),
            None => rows.push(Category {
                id,
                name: name.to_string(),
            }),
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.check(TableOp::Delete)?;
        self.rows.write().retain(|row| row.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let table = MemoryTable::new();
        let a = table.insert("Books").await.unwrap();
        let b = table.insert("Books").await.unwrap();
        assert_ne!(a, b);

        let rows = table.scan().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, a);
        assert_eq!(rows[1].id, b);
    }

    #[tokio::test]
    async fn test_update_of_missing_key_upserts() {
        let table = MemoryTable::new();
        let id = Uuid::new_v4();
        table.update(id, "Ghost").await.unwrap();

        let row = table.lookup(id).await.unwrap().unwrap();
        assert_eq!(row.name, "Ghost");
    }

    #[tokio::test]
    async fn test_delete_of_missing_key_is_noop() {
        let table = MemoryTable::new();
        table.insert("Books").await.unwrap();
        table.delete(Uuid::new_v4()).await.unwrap();
        assert_eq!(table.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_targets_one_op() {
        let table = MemoryTable::new();
        let id = table.insert("Books").await.unwrap();

        table.fail_on(TableOp::Update);
        assert!(table.contains(id).await.unwrap());
        assert!(matches!(
            table.update(id, "Comics").await,
            Err(StoreError::Unavailable(_))
        ));

        table.recover(TableOp::Update);
        table.update(id, "Comics").await.unwrap();
        assert_eq!(table.rows()[0].name, "Comics");
    }

    #[tokio::test]
    async fn test_unavailable_fails_everything() {
        let table = MemoryTable::unavailable();
        assert!(table.scan().await.is_err());
        assert!(table.insert("Books").await.is_err());
        assert!(table.delete(Uuid::new_v4()).await.is_err());
        assert!(table.rows().is_empty());
    }
}
