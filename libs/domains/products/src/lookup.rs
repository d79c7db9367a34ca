//! Category resolution needed by product listings and writes

use async_trait::async_trait;
use domain_categories::{CategoryError, CategoryRepository, CategoryService};
use uuid::Uuid;

use crate::error::ProductResult;

/// What the product service needs to know about categories
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryLookup: Send + Sync {
    /// Whether an active category with this id exists
    async fn category_exists(&self, id: Uuid) -> ProductResult<bool>;

    /// Ids of the active category named by `key` (id or slug) and its
    /// active descendants; `None` when no such category exists
    async fn category_scope(&self, key: &str) -> ProductResult<Option<Vec<Uuid>>>;
}

#[async_trait]
impl<R: CategoryRepository + 'static> CategoryLookup for CategoryService<R> {
    async fn category_exists(&self, id: Uuid) -> ProductResult<bool> {
        match self.get_active(id).await {
            Ok(_) => Ok(true),
            Err(CategoryError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn category_scope(&self, key: &str) -> ProductResult<Option<Vec<Uuid>>> {
        Ok(self.subtree_ids(key).await?)
    }
}
