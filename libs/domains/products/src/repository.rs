use async_trait::async_trait;
use axum_helpers::Pagination;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Product, ProductQuery, StockLine};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert; a taken slug yields `DuplicateSlug`
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    async fn get_by_slug(&self, slug: &str) -> ProductResult<Option<Product>>;

    /// One page in the requested order
    async fn list(&self, query: ProductQuery, page: Pagination) -> ProductResult<Vec<Product>>;

    async fn count(&self, query: ProductQuery) -> ProductResult<u64>;

    /// Write an admin edit and return the product as stored afterwards.
    ///
    /// `variants`, `total_stock`, `sizes` and `colors` are written only when
    /// `replace_variants` is set; `sold_count` is never written. Stock moved
    /// by `decrement_stock`/`increment_stock` meanwhile is kept.
    async fn update(&self, product: Product, replace_variants: bool) -> ProductResult<Product>;

    /// Active products in `category_id` other than `exclude`, best sellers first
    async fn related(
        &self,
        category_id: Uuid,
        exclude: Uuid,
        limit: u64,
    ) -> ProductResult<Vec<Product>>;

    /// Active products with `total_stock <= threshold`, lowest first
    async fn low_stock(&self, threshold: i32, limit: u64) -> ProductResult<Vec<Product>>;

    /// Set one variant's stock and refresh `total_stock`; `None` when the
    /// product or variant does not exist
    async fn set_variant_stock(
        &self,
        id: Uuid,
        size: &str,
        color: &str,
        stock: i32,
    ) -> ProductResult<Option<Product>>;

    /// Atomically take `line.quantity` units from an active product's
    /// variant. `false` when the variant is missing or short.
    async fn decrement_stock(&self, line: &StockLine) -> ProductResult<bool>;

    /// Put units back (cancellation, failed order); `false` when the
    /// variant no longer exists
    async fn increment_stock(&self, line: &StockLine) -> ProductResult<bool>;
}
