//! Catalog access needed to place and cancel orders

use async_trait::async_trait;
use domain_products::{ProductRepository, ProductService, StockLine};
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};

/// Product details copied onto an order line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub unit_price: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Current details of an active product's variant
    async fn snapshot(
        &self,
        product_id: Uuid,
        size: &str,
        color: &str,
    ) -> OrderResult<ProductSnapshot>;

    /// Take stock for one line; fails when not enough is left
    async fn reserve(&self, line: &StockLine) -> OrderResult<()>;

    /// Return stock for one line
    async fn release(&self, line: &StockLine) -> OrderResult<()>;
}

#[async_trait]
impl<R: ProductRepository + 'static> Inventory for ProductService<R> {
    async fn snapshot(
        &self,
        product_id: Uuid,
        size: &str,
        color: &str,
    ) -> OrderResult<ProductSnapshot> {
        let product = self.get_active(product_id).await?;
        if product.variant(size, color).is_none() {
            return Err(OrderError::VariantUnavailable {
                name: product.name,
                size: size.to_string(),
                color: color.to_string(),
            });
        }

        Ok(ProductSnapshot {
            image: product.images.first().cloned(),
            name: product.name,
            slug: product.slug,
            unit_price: product.price,
        })
    }

    async fn reserve(&self, line: &StockLine) -> OrderResult<()> {
        Ok(self.reserve_stock(line).await?)
    }

    async fn release(&self, line: &StockLine) -> OrderResult<()> {
        Ok(self.release_stock(line).await?)
    }
}
