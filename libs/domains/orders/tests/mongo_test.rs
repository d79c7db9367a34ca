//! MongoDB adapter tests. They start a container, so they only run with
//! `cargo test -- --ignored` on a machine with Docker.

use async_trait::async_trait;
use domain_orders::order_number::is_order_number;
use domain_orders::*;
use domain_products::StockLine;
use serde_json::json;
use std::collections::HashSet;
use test_utils::{TestDataBuilder, TestMongo};
use uuid::Uuid;

struct UnlimitedStock;

#[async_trait]
impl Inventory for UnlimitedStock {
    async fn snapshot(&self, _: Uuid, _: &str, _: &str) -> OrderResult<ProductSnapshot> {
        Ok(ProductSnapshot {
            name: "Chemise Lin".to_string(),
            slug: "chemise-lin".to_string(),
            image: None,
            unit_price: 18_500,
        })
    }

    async fn reserve(&self, _: &StockLine) -> OrderResult<()> {
        Ok(())
    }

    async fn release(&self, _: &StockLine) -> OrderResult<()> {
        Ok(())
    }
}

fn input() -> CreateOrder {
    serde_json::from_value(json!({
        "customer": {
            "first_name": "Moussa",
            "last_name": "Ba",
            "email": "moussa@example.com",
            "phone": "+221770000000"
        },
        "shipping_address": {
            "street": "3 Avenue Bourguiba",
            "city": "Dakar",
            "state": "Dakar",
            "country": "SN"
        },
        "items": [
            { "product_id": Uuid::now_v7(), "size": "L", "color": "Sable", "quantity": 1 }
        ]
    }))
    .unwrap()
}

fn unsaved_order() -> Order {
    Order::place(None, input(), Vec::new(), ShippingRates::default())
}

async fn repository(mongo: &TestMongo, builder: &TestDataBuilder) -> MongoOrderRepository {
    let repository = MongoOrderRepository::new(&mongo.database(&builder.database_name()));
    repository.init_indexes().await.unwrap();
    repository
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_unique_index_rejects_repeated_order_number() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_unique_index_rejects_repeated_order_number");
    let repository = repository(&mongo, &builder).await;

    let mut first = unsaved_order();
    first.order_number = "CMD-250307-48213".to_string();
    repository.insert(first).await.unwrap();

    let mut second = unsaved_order();
    second.order_number = "CMD-250307-48213".to_string();
    let result = repository.insert(second).await;

    assert!(matches!(result, Err(OrderError::DuplicateOrderNumber(n)) if n == "CMD-250307-48213"));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_orders_without_number_coexist_and_get_backfilled() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_orders_without_number_coexist");
    let repository = repository(&mongo, &builder).await;

    let legacy_a = unsaved_order();
    let mut legacy_b = unsaved_order();
    legacy_b.customer.email = builder.email("legacy");
    legacy_b.guest_email = Some(legacy_b.customer.email.clone());
    repository.insert(legacy_a.clone()).await.unwrap();
    repository.insert(legacy_b.clone()).await.unwrap();
    assert_eq!(repository.missing_numbers(10).await.unwrap().len(), 2);

    let service = OrderService::new(repository, UnlimitedStock);
    assert_eq!(service.backfill_order_numbers().await.unwrap(), 2);

    let a = service.get(legacy_a.id).await.unwrap();
    let b = service.get(legacy_b.id).await.unwrap();
    assert!(is_order_number(&a.order_number));
    assert!(is_order_number(&b.order_number));
    assert_ne!(a.order_number, b.order_number);
    assert_eq!(b.tracking_email(), builder.email("legacy"));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_concurrent_checkouts_get_distinct_numbers() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_concurrent_checkouts_get_distinct_numbers");
    let repository = repository(&mongo, &builder).await;
    let service = OrderService::new(repository, UnlimitedStock);

    let customer = builder.user_id();

    let mut tasks = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        let user_id = (i % 2 == 0).then_some(customer);
        tasks.push(tokio::spawn(async move { service.create(user_id, input()).await }));
    }

    let mut numbers = HashSet::new();
    for task in tasks {
        let order = task.await.unwrap().unwrap();
        assert!(is_order_number(&order.order_number));
        assert!(numbers.insert(order.order_number));
    }
    assert_eq!(numbers.len(), 50);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_replace_if_status_loses_to_an_earlier_writer() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_replace_if_status_loses");
    let repository = repository(&mongo, &builder).await;

    let mut order = unsaved_order();
    order.order_number = "CMD-250307-10001".to_string();
    repository.insert(order.clone()).await.unwrap();

    let mut confirmed = order.clone();
    assert!(confirmed.transition(OrderStatus::Confirmed, None, None));
    assert!(repository
        .replace_if_status(confirmed, OrderStatus::Pending)
        .await
        .unwrap());

    let mut cancelled = order;
    assert!(cancelled.transition(OrderStatus::Cancelled, None, None));
    assert!(!repository
        .replace_if_status(cancelled, OrderStatus::Pending)
        .await
        .unwrap());
}
