//! Handler tests for the orders domain
//!
//! Routers are wired like the API binary wires them, over an in-memory
//! order store that enforces order-number uniqueness the way the unique
//! index does, and an in-memory stock ledger.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::{from_fn, from_fn_with_state},
};
use axum_helpers::{
    JwtAuth, JwtConfig, Pagination, ROLE_ADMIN, ROLE_CUSTOMER, jwt_auth_middleware,
    optional_jwt_auth_middleware, require_admin,
};
use domain_orders::order_number::{MAX_SAVE_ATTEMPTS, is_order_number};
use domain_orders::*;
use domain_products::StockLine;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "orders-handler-test-secret-over-32-chars";

#[derive(Clone, Default)]
struct InMemoryOrders {
    orders: Arc<Mutex<Vec<Order>>>,
    inserts: Arc<AtomicU32>,
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn insert(&self, order: Order) -> OrderResult<Order> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_number == order.order_number) {
            return Err(OrderError::DuplicateOrderNumber(order.order_number));
        }
        orders.push(order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn get_by_number(&self, order_number: &str) -> OrderResult<Option<Order>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().find(|o| o.order_number == order_number).cloned())
    }

    async fn number_exists(&self, order_number: &str) -> OrderResult<bool> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().any(|o| o.order_number == order_number))
    }

    async fn list(&self, query: OrderQuery, page: Pagination) -> OrderResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| query.user_id.is_none_or(|u| o.user_id == Some(u)))
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn count(&self, query: OrderQuery) -> OrderResult<u64> {
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .filter(|o| query.user_id.is_none_or(|u| o.user_id == Some(u)))
            .filter(|o| query.status.is_none_or(|s| o.status == s))
            .count() as u64)
    }

    async fn replace_if_status(&self, order: Order, expected: OrderStatus) -> OrderResult<bool> {
        let mut orders = self.orders.lock().unwrap();
        match orders
            .iter_mut()
            .find(|o| o.id == order.id && o.status == expected)
        {
            Some(slot) => {
                *slot = order;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn missing_numbers(&self, limit: u64) -> OrderResult<Vec<Order>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .filter(|o| o.order_number.is_empty())
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn assign_number(&self, id: Uuid, order_number: &str) -> OrderResult<bool> {
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_number == order_number) {
            return Err(OrderError::DuplicateOrderNumber(order_number.to_string()));
        }
        match orders
            .iter_mut()
            .find(|o| o.id == id && o.order_number.is_empty())
        {
            Some(order) => {
                order.order_number = order_number.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Every insert clashes on the order number
#[derive(Clone, Default)]
struct AlwaysTaken {
    inner: InMemoryOrders,
}

#[async_trait]
impl OrderRepository for AlwaysTaken {
    async fn insert(&self, order: Order) -> OrderResult<Order> {
        self.inner.inserts.fetch_add(1, Ordering::SeqCst);
        Err(OrderError::DuplicateOrderNumber(order.order_number))
    }

    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        self.inner.get_by_id(id).await
    }

    async fn get_by_number(&self, order_number: &str) -> OrderResult<Option<Order>> {
        self.inner.get_by_number(order_number).await
    }

    async fn number_exists(&self, _order_number: &str) -> OrderResult<bool> {
        Ok(true)
    }

    async fn list(&self, query: OrderQuery, page: Pagination) -> OrderResult<Vec<Order>> {
        self.inner.list(query, page).await
    }

    async fn count(&self, query: OrderQuery) -> OrderResult<u64> {
        self.inner.count(query).await
    }

    async fn replace_if_status(&self, order: Order, expected: OrderStatus) -> OrderResult<bool> {
        self.inner.replace_if_status(order, expected).await
    }

    async fn missing_numbers(&self, limit: u64) -> OrderResult<Vec<Order>> {
        self.inner.missing_numbers(limit).await
    }

    async fn assign_number(&self, id: Uuid, order_number: &str) -> OrderResult<bool> {
        self.inner.assign_number(id, order_number).await
    }
}

/// (product, size, color) -> units on hand
#[derive(Clone)]
struct StockLedger {
    stock: Arc<Mutex<HashMap<(Uuid, String, String), i32>>>,
    price: i64,
}

impl StockLedger {
    fn with(product_id: Uuid, units: i32, price: i64) -> Self {
        let stock = HashMap::from([((product_id, "M".to_string(), "Indigo".to_string()), units)]);
        Self {
            stock: Arc::new(Mutex::new(stock)),
            price,
        }
    }

    fn on_hand(&self, product_id: Uuid) -> i32 {
        let stock = self.stock.lock().unwrap();
        stock[&(product_id, "M".to_string(), "Indigo".to_string())]
    }

    fn key(line: &StockLine) -> (Uuid, String, String) {
        (line.product_id, line.size.clone(), line.color.clone())
    }
}

#[async_trait]
impl Inventory for StockLedger {
    async fn snapshot(
        &self,
        product_id: Uuid,
        size: &str,
        color: &str,
    ) -> OrderResult<ProductSnapshot> {
        let stock = self.stock.lock().unwrap();
        if !stock.contains_key(&(product_id, size.to_string(), color.to_string())) {
            return Err(OrderError::ProductUnavailable(product_id));
        }
        Ok(ProductSnapshot {
            name: "Wrap Dress".to_string(),
            slug: "wrap-dress".to_string(),
            image: Some("/uploads/wrap.jpg".to_string()),
            unit_price: self.price,
        })
    }

    async fn reserve(&self, line: &StockLine) -> OrderResult<()> {
        let mut stock = self.stock.lock().unwrap();
        let units = stock.entry(Self::key(line)).or_insert(0);
        if *units < line.quantity {
            return Err(OrderError::InsufficientStock(format!(
                "Insufficient stock for Wrap Dress ({}/{})",
                line.size, line.color
            )));
        }
        *units -= line.quantity;
        Ok(())
    }

    async fn release(&self, line: &StockLine) -> OrderResult<()> {
        let mut stock = self.stock.lock().unwrap();
        *stock.entry(Self::key(line)).or_insert(0) += line.quantity;
        Ok(())
    }
}

struct TestApp {
    router: Router,
    jwt: JwtAuth,
    service: OrderService<InMemoryOrders>,
    ledger: StockLedger,
    product: Uuid,
}

fn wire<R: OrderRepository + 'static>(service: OrderService<R>, jwt: &JwtAuth) -> Router {
    let checkout = handlers::router(service.clone())
        .route_layer(from_fn_with_state(jwt.clone(), optional_jwt_auth_middleware));
    let customer = handlers::customer_router(service.clone())
        .route_layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));
    let admin = handlers::admin_router(service)
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));

    Router::new()
        .merge(checkout)
        .merge(customer)
        .nest("/admin", admin)
}

fn test_app() -> TestApp {
    let jwt = JwtAuth::new(&JwtConfig::new(SECRET, Duration::from_secs(3600)).unwrap());
    let product = Uuid::now_v7();
    let ledger = StockLedger::with(product, 10, 4_000);
    let service = OrderService::new(InMemoryOrders::default(), ledger.clone());

    TestApp {
        router: wire(service.clone(), &jwt),
        jwt,
        service,
        ledger,
        product,
    }
}

fn token(jwt: &JwtAuth, user_id: Uuid, role: &str) -> String {
    jwt.create_token(user_id, "awa@example.com", "Awa D", &[role.to_string()])
        .unwrap()
}

fn order_body(product: Uuid, quantity: i32) -> Value {
    json!({
        "customer": {
            "first_name": "Awa",
            "last_name": "Diallo",
            "email": "Awa@Example.com",
            "phone": "+221700000000"
        },
        "shipping_address": {
            "street": "12 Rue Carnot",
            "city": "Dakar",
            "state": "Dakar",
            "country": "SN"
        },
        "items": [
            { "product_id": product, "size": "M", "color": "Indigo", "quantity": quantity }
        ]
    })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_guest_checkout_and_tracking() {
    let app = test_app();

    let (status, order) = send(
        &app.router,
        "POST",
        "/orders",
        None,
        Some(order_body(app.product, 2)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let number = order["order_number"].as_str().unwrap().to_string();
    assert!(is_order_number(&number));
    assert_eq!(order["subtotal"], 8_000);
    assert_eq!(order["shipping_cost"], 500);
    assert_eq!(order["total"], 8_500);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_method"], "cash_on_delivery");
    assert_eq!(order["guest_email"], "awa@example.com");
    assert_eq!(app.ledger.on_hand(app.product), 8);

    let (status, tracked) = send(
        &app.router,
        "GET",
        &format!("/orders/track/{number}?email=awa@example.com"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracked["_id"], order["_id"]);

    let (status, _) = send(
        &app.router,
        "GET",
        &format!("/orders/track/{number}?email=other@example.com"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_in_order_is_attached_to_the_account() {
    let app = test_app();
    let user = Uuid::now_v7();
    let customer = token(&app.jwt, user, ROLE_CUSTOMER);

    let (status, order) = send(
        &app.router,
        "POST",
        "/orders",
        Some(&customer),
        Some(order_body(app.product, 1)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["user_id"], user.to_string());
    assert!(order["guest_email"].is_null());

    let (status, mine) = send(&app.router, "GET", "/orders/mine", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["total"], 1);

    let stranger = token(&app.jwt, Uuid::now_v7(), ROLE_CUSTOMER);
    let id = order["_id"].as_str().unwrap();
    let (status, _) = send(&app.router, "GET", &format!("/orders/{id}"), Some(&stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = token(&app.jwt, Uuid::now_v7(), ROLE_ADMIN);
    let (status, _) = send(&app.router, "GET", &format!("/orders/{id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_rejected_when_stock_runs_out() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        "POST",
        "/orders",
        None,
        Some(order_body(app.product, 11)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.ledger.on_hand(app.product), 10);

    let (status, _) = send(
        &app.router,
        "POST",
        "/orders",
        None,
        Some(order_body(Uuid::now_v7(), 1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_requires_items_and_valid_email() {
    let app = test_app();

    let mut body = order_body(app.product, 1);
    body["items"] = json!([]);
    let (status, _) = send(&app.router, "POST", "/orders", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = order_body(app.product, 1);
    body["customer"]["email"] = json!("not-an-email");
    let (status, _) = send(&app.router, "POST", "/orders", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_cancels_pending_order_and_stock_returns() {
    let app = test_app();
    let user = Uuid::now_v7();
    let customer = token(&app.jwt, user, ROLE_CUSTOMER);

    let (_, order) = send(
        &app.router,
        "POST",
        "/orders",
        Some(&customer),
        Some(order_body(app.product, 3)),
    )
    .await;
    let id = order["_id"].as_str().unwrap();
    assert_eq!(app.ledger.on_hand(app.product), 7);

    let (status, cancelled) = send(
        &app.router,
        "POST",
        &format!("/orders/{id}/cancel"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(app.ledger.on_hand(app.product), 10);

    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/orders/{id}/cancel"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.ledger.on_hand(app.product), 10);
}

#[tokio::test]
async fn test_admin_walks_order_to_delivery() {
    let app = test_app();
    let admin = token(&app.jwt, Uuid::now_v7(), ROLE_ADMIN);
    let customer = token(&app.jwt, Uuid::now_v7(), ROLE_CUSTOMER);

    let (_, order) = send(
        &app.router,
        "POST",
        "/orders",
        None,
        Some(order_body(app.product, 1)),
    )
    .await;
    let id = order["_id"].as_str().unwrap();
    let status_uri = format!("/admin/orders/{id}/status");

    let (status, _) = send(
        &app.router,
        "PUT",
        &status_uri,
        Some(&customer),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app.router,
        "PUT",
        &status_uri,
        Some(&admin),
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut last = Value::Null;
    for next in ["confirmed", "processing", "shipped", "delivered"] {
        let (status, body) = send(
            &app.router,
            "PUT",
            &status_uri,
            Some(&admin),
            Some(json!({ "status": next, "note": format!("now {next}") })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "transition to {next}");
        last = body;
    }
    assert_eq!(last["payment_status"], "paid");
    assert_eq!(last["status_history"].as_array().unwrap().len(), 5);

    let (_, listed) = send(
        &app.router,
        "GET",
        "/admin/orders?status=delivered",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_admin_sets_payment_status() {
    let app = test_app();
    let admin = token(&app.jwt, Uuid::now_v7(), ROLE_ADMIN);
    let (_, order) = send(
        &app.router,
        "POST",
        "/orders",
        None,
        Some(order_body(app.product, 1)),
    )
    .await;
    let id = order["_id"].as_str().unwrap();

    let (status, updated) = send(
        &app.router,
        "PUT",
        &format!("/admin/orders/{id}/payment"),
        Some(&admin),
        Some(json!({ "payment_status": "paid" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["payment_status"], "paid");
}

#[tokio::test]
async fn test_concurrent_orders_get_distinct_numbers() {
    let product = Uuid::now_v7();
    let ledger = StockLedger::with(product, 1_000, 1_000);
    let repository = InMemoryOrders::default();
    let service = OrderService::new(repository.clone(), ledger);

    let body = order_body(product, 1);
    let mut tasks = Vec::new();
    for _ in 0..64 {
        let service = service.clone();
        let input: CreateOrder = serde_json::from_value(body.clone()).unwrap();
        tasks.push(tokio::spawn(async move { service.create(None, input).await }));
    }

    let mut numbers = HashSet::new();
    for task in tasks {
        let order = task.await.unwrap().unwrap();
        assert!(numbers.insert(order.order_number));
    }
    assert_eq!(numbers.len(), 64);
    assert_eq!(repository.orders.lock().unwrap().len(), 64);
}

#[tokio::test]
async fn test_exhausted_order_numbers_fail_with_500_and_restore_stock() {
    let jwt = JwtAuth::new(&JwtConfig::new(SECRET, Duration::from_secs(3600)).unwrap());
    let product = Uuid::now_v7();
    let ledger = StockLedger::with(product, 5, 4_000);
    let repository = AlwaysTaken::default();
    let service = OrderService::new(repository.clone(), ledger.clone());
    let router = wire(service, &jwt);

    let (status, _) = send(&router, "POST", "/orders", None, Some(order_body(product, 2))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(repository.inner.inserts.load(Ordering::SeqCst), MAX_SAVE_ATTEMPTS);
    assert_eq!(ledger.on_hand(product), 5);
}

#[tokio::test]
async fn test_backfill_numbers_legacy_orders() {
    let app = test_app();
    let (_, order) = send(
        &app.router,
        "POST",
        "/orders",
        None,
        Some(order_body(app.product, 1)),
    )
    .await;
    let id: Uuid = order["_id"].as_str().unwrap().parse().unwrap();

    // Simulate a document saved before numbers existed
    let repository = InMemoryOrders::default();
    let mut legacy = app.service.get(id).await.unwrap();
    legacy.order_number = String::new();
    repository.orders.lock().unwrap().push(legacy);
    let service = OrderService::new(repository.clone(), app.ledger.clone());

    assert_eq!(service.backfill_order_numbers().await.unwrap(), 1);
    let stored = repository.get_by_id(id).await.unwrap().unwrap();
    assert!(is_order_number(&stored.order_number));
    assert_eq!(service.backfill_order_numbers().await.unwrap(), 0);
}
