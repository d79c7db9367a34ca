//! Product Service - Business logic layer

use axum_helpers::{Paginated, Pagination, pagination::DEFAULT_LIMIT};
use database::slug::{candidate, slugify};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::lookup::CategoryLookup;
use crate::models::{
    CreateProduct, LowStockQuery, Product, ProductFilter, ProductQuery, ProductSort,
    SetVariantStock, StockLine, UpdateProduct,
};
use crate::repository::ProductRepository;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Attempts at `slug`, `slug-2`, ... before giving up
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

const FEATURED_DEFAULT_LIMIT: u64 = 8;
const RELATED_DEFAULT_LIMIT: u64 = 4;
const RELATED_MAX_LIMIT: u64 = 12;
const LOW_STOCK_DEFAULT_LIMIT: u64 = 50;

/// Product service providing business logic operations
///
/// Catalog reads for the storefront, admin writes, and the stock
/// reservation operations used by order placement.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    categories: Arc<dyn CategoryLookup>,
    low_stock_threshold: i32,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, categories: impl CategoryLookup + 'static) -> Self {
        Self {
            repository: Arc::new(repository),
            categories: Arc::new(categories),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    pub fn with_low_stock_threshold(mut self, threshold: i32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn low_stock_threshold(&self) -> i32 {
        self.low_stock_threshold
    }

    /// Storefront listing; inactive products never appear
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ProductFilter) -> ProductResult<Paginated<Product>> {
        self.paginate(filter, Some(true)).await
    }

    /// Admin listing; `is_active` in the filter is honoured
    #[instrument(skip(self))]
    pub async fn list_all(&self, filter: ProductFilter) -> ProductResult<Paginated<Product>> {
        let is_active = filter.is_active;
        self.paginate(filter, is_active).await
    }

    #[instrument(skip(self))]
    pub async fn featured(&self, limit: Option<u64>) -> ProductResult<Vec<Product>> {
        let query = ProductQuery {
            featured: Some(true),
            is_active: Some(true),
            sort: ProductSort::Newest,
            ..Default::default()
        };
        self.repository
            .list(query, Pagination::new(None, limit, FEATURED_DEFAULT_LIMIT))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_active(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_active_by_slug(&self, slug: &str) -> ProductResult<Product> {
        self.repository
            .get_by_slug(slug)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| ProductError::SlugNotFound(slug.to_string()))
    }

    /// Admin lookup, inactive included
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Other active products from the same category
    #[instrument(skip(self))]
    pub async fn related(&self, id: Uuid, limit: Option<u64>) -> ProductResult<Vec<Product>> {
        let product = self.get_active(id).await?;
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(RELATED_DEFAULT_LIMIT)
            .min(RELATED_MAX_LIMIT);
        self.repository
            .related(product.category_id, product.id, limit)
            .await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        self.ensure_category(input.category_id).await?;

        let slug = self.unique_slug(&input.name, None).await?;
        let product = Product::new(input, slug);
        product
            .check_invariants()
            .map_err(ProductError::Validation)?;

        let product = self.repository.create(product).await?;
        tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let mut product = self.get(id).await?;

        if let Some(category_id) = input.category_id
            && category_id != product.category_id
        {
            self.ensure_category(category_id).await?;
        }

        let replace_variants = input.variants.is_some();
        if let Some(name) = input.name.as_deref() {
            let name = name.trim();
            if name != product.name {
                product.slug = self.unique_slug(name, Some(id)).await?;
                product.name = name.to_string();
            }
        }
        product.apply_update(input);
        product
            .check_invariants()
            .map_err(ProductError::Validation)?;

        self.repository.update(product, replace_variants).await
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ProductResult<Product> {
        let mut product = self.get(id).await?;
        product.apply_update(UpdateProduct {
            is_active: Some(false),
            ..Default::default()
        });
        let product = self.repository.update(product, false).await?;
        tracing::info!(product_id = %id, "Product deactivated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn set_variant_stock(
        &self,
        id: Uuid,
        input: SetVariantStock,
    ) -> ProductResult<Product> {
        self.get(id).await?;
        self.repository
            .set_variant_stock(id, &input.size, &input.color, input.stock)
            .await?
            .ok_or(ProductError::VariantNotFound {
                product_id: id,
                size: input.size,
                color: input.color,
            })
    }

    /// Active products at or below the threshold, lowest stock first
    #[instrument(skip(self))]
    pub async fn low_stock(&self, query: LowStockQuery) -> ProductResult<Vec<Product>> {
        let threshold = query.threshold.unwrap_or(self.low_stock_threshold).max(0);
        let limit = Pagination::new(None, query.limit, LOW_STOCK_DEFAULT_LIMIT).limit;
        self.repository.low_stock(threshold, limit).await
    }

    /// Take units out of stock for an order line
    #[instrument(skip(self), fields(product_id = %line.product_id, size = %line.size, color = %line.color))]
    pub async fn reserve_stock(&self, line: &StockLine) -> ProductResult<()> {
        if line.quantity <= 0 {
            return Err(ProductError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        if self.repository.decrement_stock(line).await? {
            return Ok(());
        }

        let name = self
            .repository
            .get_by_id(line.product_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| line.product_id.to_string());
        Err(ProductError::InsufficientStock {
            name,
            size: line.size.clone(),
            color: line.color.clone(),
            requested: line.quantity,
        })
    }

    /// Put units of an order line back into stock
    #[instrument(skip(self), fields(product_id = %line.product_id, size = %line.size, color = %line.color))]
    pub async fn release_stock(&self, line: &StockLine) -> ProductResult<()> {
        if !self.repository.increment_stock(line).await? {
            tracing::warn!(
                quantity = line.quantity,
                "Variant no longer exists, stock not restored"
            );
        }
        Ok(())
    }

    async fn paginate(
        &self,
        filter: ProductFilter,
        is_active: Option<bool>,
    ) -> ProductResult<Paginated<Product>> {
        let page = Pagination::new(filter.page, filter.limit, DEFAULT_LIMIT);
        let query = self.resolve(filter, is_active).await?;

        if query.category_ids.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Paginated::new(Vec::new(), 0, page));
        }

        let total = self.repository.count(query.clone()).await?;
        let products = self.repository.list(query, page).await?;
        Ok(Paginated::new(products, total, page))
    }

    /// Turn request parameters into repository criteria
    async fn resolve(
        &self,
        filter: ProductFilter,
        is_active: Option<bool>,
    ) -> ProductResult<ProductQuery> {
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price)
            && min > max
        {
            return Err(ProductError::Validation(
                "min_price must not exceed max_price".to_string(),
            ));
        }

        let category_ids = match non_blank(filter.category) {
            // Unknown category: nothing matches
            Some(key) => Some(
                self.categories
                    .category_scope(&key)
                    .await?
                    .unwrap_or_default(),
            ),
            None => None,
        };

        Ok(ProductQuery {
            category_ids,
            search: non_blank(filter.search),
            min_price: filter.min_price,
            max_price: filter.max_price,
            size: non_blank(filter.size),
            color: non_blank(filter.color),
            featured: filter.featured,
            is_active,
            sort: filter.sort.unwrap_or_default(),
        })
    }

    async fn ensure_category(&self, category_id: Uuid) -> ProductResult<()> {
        if self.categories.category_exists(category_id).await? {
            Ok(())
        } else {
            Err(ProductError::CategoryNotFound(category_id))
        }
    }

    /// First free slug among `base`, `base-2`, ...; `own` is the product
    /// being renamed, whose current slug counts as free.
    async fn unique_slug(&self, name: &str, own: Option<Uuid>) -> ProductResult<String> {
        let base = slugify(name);
        if base.is_empty() {
            return Err(ProductError::Validation(
                "name must contain letters or digits".to_string(),
            ));
        }

        for attempt in 0..MAX_SLUG_ATTEMPTS {
            let slug = candidate(&base, attempt);
            match self.repository.get_by_slug(&slug).await? {
                None => return Ok(slug),
                Some(existing) if Some(existing.id) == own => return Ok(slug),
                Some(_) => continue,
            }
        }
        Err(ProductError::DuplicateSlug(base))
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            categories: Arc::clone(&self.categories),
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
