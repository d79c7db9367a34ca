use chrono::NaiveDate;
use domain_orders::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    /// Sum of order totals, cancelled orders excluded (minor units)
    pub total_revenue: i64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub total_customers: u64,
    pub active_products: u64,
    /// Active products at or below the low-stock threshold
    pub low_stock_products: u64,
    pub low_stock_threshold: i32,
}

/// Revenue and order count for one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: i64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct SalesQuery {
    /// Days back from today, 1 to 365 (default 30)
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct LimitQuery {
    /// 1 to 50 (default 10)
    pub limit: Option<u32>,
}
