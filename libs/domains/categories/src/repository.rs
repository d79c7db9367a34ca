use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CategoryResult;
use crate::models::{Category, CategoryFilter};

/// Repository trait for Category persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert; a taken slug yields `DuplicateSlug`
    async fn create(&self, category: Category) -> CategoryResult<Category>;

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>>;

    async fn get_by_slug(&self, slug: &str) -> CategoryResult<Option<Category>>;

    /// Sorted by `sort_order`, then name
    async fn list(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>>;

    /// Replace the stored category; a taken slug yields `DuplicateSlug`
    async fn update(&self, category: Category) -> CategoryResult<Category>;

    async fn slug_exists(&self, slug: &str) -> CategoryResult<bool>;

    async fn count_active_children(&self, parent_id: Uuid) -> CategoryResult<u64>;
}
