use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_orders::{Order, OrderStatus};

use crate::error::AnalyticsResult;
use crate::models::{DailySales, StatusCount, TopProduct};

/// Read-only aggregations over orders, products and users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Sum of order totals, cancelled orders excluded
    async fn revenue(&self) -> AnalyticsResult<i64>;

    async fn count_orders(&self, status: Option<OrderStatus>) -> AnalyticsResult<u64>;

    async fn count_customers(&self) -> AnalyticsResult<u64>;

    async fn count_active_products(&self) -> AnalyticsResult<u64>;

    /// Active products whose total stock is at or below `threshold`
    async fn count_low_stock(&self, threshold: i32) -> AnalyticsResult<u64>;

    /// Days with at least one non-cancelled order since `since`, oldest first
    async fn daily_sales(&self, since: DateTime<Utc>) -> AnalyticsResult<Vec<DailySales>>;

    /// Best sellers by quantity over non-cancelled orders
    async fn top_products(&self, limit: u32) -> AnalyticsResult<Vec<TopProduct>>;

    /// Only statuses that have orders
    async fn orders_by_status(&self) -> AnalyticsResult<Vec<StatusCount>>;

    async fn recent_orders(&self, limit: u32) -> AnalyticsResult<Vec<Order>>;
}
