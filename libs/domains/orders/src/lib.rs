//! Orders Domain
//!
//! Checkout for signed-in customers and guests, order tracking and the
//! admin fulfilment workflow.
//!
//! Placing an order:
//! 1. Line items are snapshotted from the catalog (name, slug, image, price)
//! 2. Stock is reserved per line through the [`Inventory`] port; a failed
//!    line releases the ones already reserved
//! 3. The order is saved with a freshly drawn [`order_number`], retried on
//!    an order-number clash up to [`order_number::MAX_SAVE_ATTEMPTS`] times
//!
//! Status moves `pending -> confirmed -> processing -> shipped -> delivered`,
//! with cancellation allowed before shipping. Every change is appended to
//! `status_history`; cancelling restocks the items.
//!
//! ```rust,ignore
//! use domain_orders::{MongoOrderRepository, OrderService, ShippingRates, handlers};
//!
//! let repository = MongoOrderRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = OrderService::new(repository, product_service.clone())
//!     .with_shipping(ShippingRates { flat_rate: 500, free_threshold: 10_000 });
//!
//! let checkout = handlers::router(service.clone());
//! let customer = handlers::customer_router(service.clone());
//! let admin = handlers::admin_router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod mongodb;
pub mod order_number;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use inventory::{Inventory, ProductSnapshot};
pub use models::{
    CreateOrder, Order, OrderFilter, OrderItem, OrderQuery, OrderStatus, PaymentMethod,
    PaymentStatus, ShippingRates, Viewer,
};
pub use mongodb::MongoOrderRepository;
pub use order_number::{generate_order_number, generate_unique_order_number};
pub use repository::OrderRepository;
pub use service::OrderService;
