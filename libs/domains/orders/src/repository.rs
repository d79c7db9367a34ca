use async_trait::async_trait;
use axum_helpers::Pagination;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::{Order, OrderQuery, OrderStatus};

/// Repository trait for Order persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order. A clash on the order-number index yields
    /// `DuplicateOrderNumber`; any other failure is a database error.
    async fn insert(&self, order: Order) -> OrderResult<Order>;

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>>;

    async fn get_by_number(&self, order_number: &str) -> OrderResult<Option<Order>>;

    async fn number_exists(&self, order_number: &str) -> OrderResult<bool>;

    /// Newest first
    async fn list(&self, query: OrderQuery, page: Pagination) -> OrderResult<Vec<Order>>;

    async fn count(&self, query: OrderQuery) -> OrderResult<u64>;

    /// Replace the stored order only while its status is still `expected`.
    /// `false` when another writer got there first.
    async fn replace_if_status(&self, order: Order, expected: OrderStatus) -> OrderResult<bool>;

    /// Orders stored without a number, oldest first
    async fn missing_numbers(&self, limit: u64) -> OrderResult<Vec<Order>>;

    /// Set the number of an order that has none yet. `false` when the order
    /// already has one.
    async fn assign_number(&self, id: Uuid, order_number: &str) -> OrderResult<bool>;
}
