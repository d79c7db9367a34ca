//! Banners Domain
//!
//! Homepage and promotional banners with an optional display window.
//! The public listing only returns banners that are active and whose
//! window contains the current time.
//!
//! ```rust,ignore
//! use domain_banners::{BannerService, MongoBannerRepository, handlers};
//!
//! let repository = MongoBannerRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = BannerService::new(repository);
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

pub use error::{BannerError, BannerResult};
pub use handlers::ApiDoc;
pub use models::{Banner, BannerFilter, BannerPlacement, CreateBanner, LiveBannerQuery, UpdateBanner};
pub use mongodb::MongoBannerRepository;
pub use repository::BannerRepository;
pub use service::BannerService;
