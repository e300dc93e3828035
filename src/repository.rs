//! The category repository.
//!
//! Every store failure is classified here, exactly once: `NotFound` is raised
//! by the repository itself and passes through untouched, anything coming
//! back from the [`CategoryTable`] becomes a `StorageFailure` with an
//! operation-specific message.

use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{CATEGORY_NOT_FOUND, CategoryError, CategoryResult, NO_CATEGORIES};
use crate::model::Category;
use crate::store::{CategoryTable, StoreError};

const LIST_FAILED: &str = "Error trying to get the categories.";
const GET_FAILED: &str = "Error trying to get the category.";
const CREATE_FAILED: &str = "Error trying to create the category.";
const UPDATE_FAILED: &str = "Error trying to update the category.";
const DELETE_FAILED: &str = "Error trying to delete the category.";

#[derive(Clone)]
pub struct CategoryRepository {
    table: Arc<dyn CategoryTable>,
}

impl CategoryRepository {
    pub fn new(table: Arc<dyn CategoryTable>) -> Self {
        Self { table }
    }

    /// All categories in store order. An empty table is `NotFound`, not an
    /// empty success.
    pub async fn list(&self) -> CategoryResult<Vec<Category>> {
        debug!("listing categories");
        let rows = self
            .table
            .scan()
            .await
            .map_err(storage_failure("list", LIST_FAILED))?;

        if rows.is_empty() {
            return Err(CategoryError::not_found(NO_CATEGORIES));
        }
        Ok(rows)
    }

    pub async fn get(&self, id: Uuid) -> CategoryResult<Category> {
        debug!(%id, "getting category");
        self.table
            .lookup(id)
            .await
            .map_err(storage_failure("get", GET_FAILED))?
            .ok_or_else(|| CategoryError::not_found(CATEGORY_NOT_FOUND))
    }

    /// Insert under a store-generated id and hand that id back.
    pub async fn create(&self, name: &str) -> CategoryResult<Uuid> {
        debug!(name, "creating category");
        self.table
            .insert(name)
            .await
            .map_err(storage_failure("create", CREATE_FAILED))
    }

    /// Check-then-write. The two statements are not atomic: a delete landing
    /// between them may make the write resurrect or miss the row.
    pub async fn update(&self, id: Uuid, name: &str) -> CategoryResult<()> {
        debug!(%id, name, "updating category");
        self.ensure_exists(id, "update", UPDATE_FAILED).await?;
        self.table
            .update(id, name)
            .await
            .map_err(storage_failure("update", UPDATE_FAILED))
    }

    /// Check-then-delete, with the same non-atomic window as [`Self::update`].
    pub async fn delete(&self, id: Uuid) -> CategoryResult<()> {
        debug!(%id, "deleting category");
        self.ensure_exists(id, "delete", DELETE_FAILED).await?;
        self.table
            .delete(id)
            .await
            .map_err(storage_failure("delete", DELETE_FAILED))
    }

    async fn ensure_exists(
        &self,
        id: Uuid,
        operation: &'static str,
        message: &'static str,
    ) -> CategoryResult<()> {
        let exists = self
            .table
            .contains(id)
            .await
            .map_err(storage_failure(operation, message))?;

        if !exists {
            return Err(CategoryError::not_found(CATEGORY_NOT_FOUND));
        }
        Ok(())
    }
}

fn storage_failure(
    operation: &'static str,
    message: &'static str,
) -> impl FnOnce(StoreError) -> CategoryError {
    move |err| {
        error!(operation, error = %err, "{}", message);
        CategoryError::storage_failure(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryTable, TableOp};

    fn repository() -> (CategoryRepository, Arc<MemoryTable>) {
        let table = Arc::new(MemoryTable::new());
        (CategoryRepository::new(table.clone()), table)
    }

    #[tokio::test]
    async fn test_update_checks_before_writing() {
        let (repo, table) = repository();
        let missing = Uuid::new_v4();

        let err = repo.update(missing, "Ghost").await.unwrap_err();
        assert_eq!(err, CategoryError::not_found(CATEGORY_NOT_FOUND));
        // memory UPDATE upserts, so a skipped check would have written a row
        assert!(table.rows().is_empty());
    }

    #[tokio::test]
    async fn test_failed_existence_check_is_storage_failure() {
        let (repo, table) = repository();
        let id = repo.create("Books").await.unwrap();

        table.fail_on(TableOp::Contains);
        let err = repo.delete(id).await.unwrap_err();
        assert_eq!(err, CategoryError::storage_failure(DELETE_FAILED));
        assert_eq!(table.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_message() {
        let (repo, table) = repository();
        table.fail_on(TableOp::Scan);
        let err = repo.list().await.unwrap_err();
        assert_eq!(err, CategoryError::storage_failure(LIST_FAILED));
    }
}
