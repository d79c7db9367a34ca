//! Categories Domain
//!
//! Product categories arranged as a tree through `parent_id`.
//!
//! - Slugs derived from names, with `-2`, `-3`, ... on collision
//! - Parent validation (exists, no cycles)
//! - Soft delete, refused while active subcategories exist
//! - Tree assembly in [`tree::build_tree`]
//!
//! ```rust,ignore
//! use domain_categories::{CategoryService, MongoCategoryRepository, handlers};
//!
//! let repository = MongoCategoryRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = CategoryService::new(repository);
//!
//! let public = handlers::router(service.clone());
//! let admin = handlers::admin_router(service);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod tree;

pub use error::{CategoryError, CategoryResult};
pub use handlers::ApiDoc;
pub use models::{Category, CategoryFilter, CategoryNode, CreateCategory, UpdateCategory};
pub use mongodb::MongoCategoryRepository;
pub use repository::CategoryRepository;
pub use service::CategoryService;
