//! Products Domain
//!
//! Catalog entries with (size, color) variants and per-variant stock.
//!
//! - Slugs derived from names, suffixed on collision
//! - `total_stock`, `sizes` and `colors` recomputed from the variants on
//!   every write
//! - Listing filters resolve a category id or slug to its whole subtree
//!   through [`CategoryLookup`]
//! - Stock reservation is a single conditional update per variant, so two
//!   orders can never both take the last unit
//!
//! ```rust,ignore
//! use domain_products::{MongoProductRepository, ProductService, handlers};
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = ProductService::new(repository, category_service.clone())
//!     .with_low_stock_threshold(5);
//!
//! let public = handlers::router(service.clone());
//! let admin = handlers::admin_router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod lookup;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use lookup::CategoryLookup;
pub use models::{
    CreateProduct, LowStockQuery, Product, ProductFilter, ProductQuery, ProductSort,
    SetVariantStock, StockLine, UpdateProduct, Variant,
};
pub use mongodb::MongoProductRepository;
pub use repository::ProductRepository;
pub use service::ProductService;
