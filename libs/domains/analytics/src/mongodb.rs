//! MongoDB implementation of AnalyticsRepository
//!
//! Everything here is an aggregation or a count over the collections the
//! other domains own; nothing is written.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use database::mongodb::{date_bson, value_bson};
use domain_orders::{Order, OrderStatus};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc, from_document},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;
use uuid::Uuid;

use crate::error::AnalyticsResult;
use crate::models::{DailySales, StatusCount, TopProduct};
use crate::repository::AnalyticsRepository;

pub struct MongoAnalyticsRepository {
    orders: Collection<Document>,
    products: Collection<Document>,
    users: Collection<Document>,
}

#[derive(Deserialize)]
struct RevenueRow {
    total: i64,
}

#[derive(Deserialize)]
struct DayRow {
    #[serde(rename = "_id")]
    date: NaiveDate,
    revenue: i64,
    orders: u64,
}

#[derive(Deserialize)]
struct ProductRow {
    #[serde(rename = "_id")]
    product_id: Uuid,
    name: String,
    quantity_sold: i64,
    revenue: i64,
}

#[derive(Deserialize)]
struct StatusRow {
    #[serde(rename = "_id")]
    status: OrderStatus,
    count: u64,
}

impl MongoAnalyticsRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            orders: db.collection("orders"),
            products: db.collection("products"),
            users: db.collection("users"),
        }
    }

    fn not_cancelled() -> Document {
        doc! { "status": { "$ne": value_bson(&OrderStatus::Cancelled) } }
    }

    fn revenue_pipeline() -> Vec<Document> {
        vec![
            doc! { "$match": Self::not_cancelled() },
            doc! { "$group": { "_id": null, "total": { "$sum": "$total" } } },
        ]
    }

    /// Timestamps are RFC 3339 strings, so the first ten bytes are the UTC date
    fn daily_sales_pipeline(since: DateTime<Utc>) -> Vec<Document> {
        let mut matched = Self::not_cancelled();
        matched.insert("created_at", doc! { "$gte": date_bson(&since) });
        vec![
            doc! { "$match": matched },
            doc! {
                "$group": {
                    "_id": { "$substrBytes": ["$created_at", 0, 10] },
                    "revenue": { "$sum": "$total" },
                    "orders": { "$sum": 1 },
                }
            },
            doc! { "$sort": { "_id": 1 } },
        ]
    }

    fn top_products_pipeline(limit: u32) -> Vec<Document> {
        vec![
            doc! { "$match": Self::not_cancelled() },
            doc! { "$unwind": "$items" },
            doc! {
                "$group": {
                    "_id": "$items.product_id",
                    "name": { "$first": "$items.name" },
                    "quantity_sold": { "$sum": "$items.quantity" },
                    "revenue": { "$sum": "$items.line_total" },
                }
            },
            doc! { "$sort": { "quantity_sold": -1, "revenue": -1 } },
            doc! { "$limit": i64::from(limit) },
        ]
    }

    fn status_pipeline() -> Vec<Document> {
        vec![
            doc! { "$group": { "_id": "$status", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": 1 } },
        ]
    }

    async fn aggregate<T: DeserializeOwned>(&self, pipeline: Vec<Document>) -> AnalyticsResult<Vec<T>> {
        let docs: Vec<Document> = self.orders.aggregate(pipeline).await?.try_collect().await?;
        let rows = docs
            .into_iter()
            .map(from_document)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(rows)
    }
}

#[async_trait]
impl AnalyticsRepository for MongoAnalyticsRepository {
    #[instrument(skip(self))]
    async fn revenue(&self) -> AnalyticsResult<i64> {
        let rows: Vec<RevenueRow> = self.aggregate(Self::revenue_pipeline()).await?;
        Ok(rows.first().map_or(0, |r| r.total))
    }

    #[instrument(skip(self))]
    async fn count_orders(&self, status: Option<OrderStatus>) -> AnalyticsResult<u64> {
        let filter = match status {
            Some(status) => doc! { "status": value_bson(&status) },
            None => doc! {},
        };
        Ok(self.orders.count_documents(filter).await?)
    }

    #[instrument(skip(self))]
    async fn count_customers(&self) -> AnalyticsResult<u64> {
        Ok(self
            .users
            .count_documents(doc! { "role": "customer" })
            .await?)
    }

    #[instrument(skip(self))]
    async fn count_active_products(&self) -> AnalyticsResult<u64> {
        Ok(self
            .products
            .count_documents(doc! { "is_active": true })
            .await?)
    }

    #[instrument(skip(self))]
    async fn count_low_stock(&self, threshold: i32) -> AnalyticsResult<u64> {
        Ok(self
            .products
            .count_documents(doc! { "is_active": true, "total_stock": { "$lte": threshold } })
            .await?)
    }

    #[instrument(skip(self))]
    async fn daily_sales(&self, since: DateTime<Utc>) -> AnalyticsResult<Vec<DailySales>> {
        let rows: Vec<DayRow> = self.aggregate(Self::daily_sales_pipeline(since)).await?;
        Ok(rows
            .into_iter()
            .map(|r| DailySales {
                date: r.date,
                revenue: r.revenue,
                orders: r.orders,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn top_products(&self, limit: u32) -> AnalyticsResult<Vec<TopProduct>> {
        let rows: Vec<ProductRow> = self.aggregate(Self::top_products_pipeline(limit)).await?;
        Ok(rows
            .into_iter()
            .map(|r| TopProduct {
                product_id: r.product_id,
                name: r.name,
                quantity_sold: r.quantity_sold,
                revenue: r.revenue,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn orders_by_status(&self) -> AnalyticsResult<Vec<StatusCount>> {
        let rows: Vec<StatusRow> = self.aggregate(Self::status_pipeline()).await?;
        Ok(rows
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                count: r.count,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn recent_orders(&self, limit: u32) -> AnalyticsResult<Vec<Order>> {
        let orders = self
            .orders
            .clone_with_type::<Order>()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(i64::from(limit))
            .await?
            .try_collect()
            .await?;
        Ok(orders)
    }
}
