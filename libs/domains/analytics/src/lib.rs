//! Analytics Domain
//!
//! Read-only figures for the admin dashboard, computed with MongoDB
//! aggregations over the orders, products and users collections:
//!
//! - headline totals (revenue excludes cancelled orders)
//! - sales per UTC day, gaps filled with zeros
//! - best sellers, order counts per status, latest orders
//!
//! ```rust,ignore
//! use domain_analytics::{AnalyticsService, MongoAnalyticsRepository, handlers};
//!
//! let service = AnalyticsService::new(MongoAnalyticsRepository::new(&db))
//!     .with_low_stock_threshold(config.low_stock_threshold);
//! let admin = handlers::admin_router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{AnalyticsError, AnalyticsResult};
pub use handlers::ApiDoc;
pub use models::{DailySales, DashboardStats, LimitQuery, SalesQuery, StatusCount, TopProduct};
pub use mongodb::MongoAnalyticsRepository;
pub use repository::AnalyticsRepository;
pub use service::AnalyticsService;
