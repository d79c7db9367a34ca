//! MongoDB implementation of OrderRepository

use async_trait::async_trait;
use axum_helpers::Pagination;
use chrono::Utc;
use database::mongodb::{contains_ci, date_bson, id_bson, id_filter, is_duplicate_key_on, value_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::models::{Order, OrderQuery, OrderStatus};
use crate::repository::OrderRepository;

pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Order>("orders"),
        }
    }

    /// Initialize indexes; the order-number index is what makes creation
    /// safe under concurrency
    pub async fn init_indexes(&self) -> OrderResult<()> {
        let indexes = vec![
            // Legacy documents without a number stay outside the index
            IndexModel::builder()
                .keys(doc! { "order_number": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "order_number": { "$gt": "" } })
                        .name("idx_order_number_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_created".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_status_created".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "customer.email": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_customer_email".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Order indexes created successfully");
        Ok(())
    }

    fn build_filter(query: &OrderQuery) -> Document {
        let mut doc = doc! {};

        if let Some(user_id) = query.user_id {
            doc.insert("user_id", id_bson(&user_id));
        }

        if let Some(status) = query.status {
            doc.insert("status", value_bson(&status));
        }

        if query.from.is_some() || query.to.is_some() {
            let mut range = doc! {};
            if let Some(from) = query.from {
                range.insert("$gte", date_bson(&from));
            }
            if let Some(to) = query.to {
                range.insert("$lte", date_bson(&to));
            }
            doc.insert("created_at", range);
        }

        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            doc.insert(
                "$or",
                vec![
                    doc! { "order_number": contains_ci(search) },
                    doc! { "customer.email": contains_ci(search) },
                    doc! { "customer.first_name": contains_ci(search) },
                    doc! { "customer.last_name": contains_ci(search) },
                ],
            );
        }

        doc
    }

    fn missing_number_filter() -> Document {
        doc! {
            "$or": [
                { "order_number": { "$exists": false } },
                { "order_number": null },
                { "order_number": "" },
            ]
        }
    }

    fn map_insert_error(err: mongodb::error::Error, order_number: &str) -> OrderError {
        if is_duplicate_key_on(&err, "order_number") {
            OrderError::DuplicateOrderNumber(order_number.to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn insert(&self, order: Order) -> OrderResult<Order> {
        self.collection
            .insert_one(&order)
            .await
            .map_err(|e| Self::map_insert_error(e, &order.order_number))?;
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.collection.find_one(id_filter(&id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_number(&self, order_number: &str) -> OrderResult<Option<Order>> {
        Ok(self
            .collection
            .find_one(doc! { "order_number": order_number })
            .await?)
    }

    #[instrument(skip(self))]
    async fn number_exists(&self, order_number: &str) -> OrderResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "order_number": order_number })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: OrderQuery, page: Pagination) -> OrderResult<Vec<Order>> {
        let orders = self
            .collection
            .find(Self::build_filter(&query))
            .sort(doc! { "created_at": -1 })
            .skip(page.skip())
            .limit(page.limit as i64)
            .await?
            .try_collect()
            .await?;
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: OrderQuery) -> OrderResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&query))
            .await?)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, to = %order.status))]
    async fn replace_if_status(&self, order: Order, expected: OrderStatus) -> OrderResult<bool> {
        let filter = doc! {
            "_id": id_bson(&order.id),
            "status": value_bson(&expected),
        };
        let result = self.collection.replace_one(filter, &order).await?;
        Ok(result.matched_count == 1)
    }

    #[instrument(skip(self))]
    async fn missing_numbers(&self, limit: u64) -> OrderResult<Vec<Order>> {
        let orders = self
            .collection
            .find(Self::missing_number_filter())
            .sort(doc! { "created_at": 1 })
            .limit(limit as i64)
            .await?
            .try_collect()
            .await?;
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn assign_number(&self, id: Uuid, order_number: &str) -> OrderResult<bool> {
        let mut filter = Self::missing_number_filter();
        filter.insert("_id", id_bson(&id));
        let update = doc! {
            "$set": {
                "order_number": order_number,
                "updated_at": date_bson(&Utc::now()),
            }
        };

        let result = self
            .collection
            .update_one(filter, update)
            .await
            .map_err(|e| Self::map_insert_error(e, order_number))?;
        Ok(result.modified_count == 1)
    }
}
