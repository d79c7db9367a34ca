//! API routes
//!
//! Every router returned here is nested under `/api` by
//! `axum_helpers::create_router`. Routes fall into four groups:
//!
//! - public: catalog, banners, register/login
//! - optional auth: checkout and guest tracking
//! - signed in: profile, own orders, admin requests
//! - admin: everything under `/admin`

pub mod health;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use axum_helpers::{JwtAuth, jwt_auth_middleware, optional_jwt_auth_middleware, require_admin};
use domain_analytics::{AnalyticsService, MongoAnalyticsRepository};
use domain_banners::{BannerService, MongoBannerRepository};
use domain_categories::{CategoryService, MongoCategoryRepository};
use domain_orders::{MongoOrderRepository, OrderService};
use domain_products::{MongoProductRepository, ProductService};
use domain_users::{
    AdminRequestService, AuthState, MongoAdminRequestRepository, MongoUserRepository, UserService,
    auth_handlers,
};
use mongodb::Database;
use tracing::info;

use crate::state::AppState;

/// Create every collection index the domains rely on. The unique index on
/// `orders.order_number` must exist before orders are accepted.
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoUserRepository::new(db).init_indexes().await?;
    MongoAdminRequestRepository::new(db).init_indexes().await?;
    MongoCategoryRepository::new(db).init_indexes().await?;
    MongoProductRepository::new(db).init_indexes().await?;
    MongoOrderRepository::new(db).init_indexes().await?;
    MongoBannerRepository::new(db).init_indexes().await?;
    info!("All indexes initialized");
    Ok(())
}

pub fn routes(state: &AppState) -> Router {
    let config = &state.config;
    let db = &state.db;
    let jwt = JwtAuth::new(&config.jwt);

    let users = UserService::new(MongoUserRepository::new(db));
    let requests = AdminRequestService::new(MongoAdminRequestRepository::new(db), users.clone());
    let auth = AuthState {
        service: users.clone(),
        jwt: jwt.clone(),
        secure_cookies: config.environment.use_https(),
    };
    let categories = CategoryService::new(MongoCategoryRepository::new(db));
    let products = ProductService::new(MongoProductRepository::new(db), categories.clone())
        .with_low_stock_threshold(config.low_stock_threshold);
    let orders = OrderService::new(MongoOrderRepository::new(db), products.clone())
        .with_shipping(config.shipping);
    let banners = BannerService::new(MongoBannerRepository::new(db));
    let analytics = AnalyticsService::new(MongoAnalyticsRepository::new(db))
        .with_low_stock_threshold(config.low_stock_threshold);
    let images = uploads::build_store(&config.uploads);

    let public = Router::new()
        .merge(auth_handlers::public_router(auth.clone()))
        .merge(domain_categories::handlers::router(categories.clone()))
        .merge(domain_products::handlers::router(products.clone()))
        .merge(domain_banners::handlers::router(banners.clone()));

    let checkout = domain_orders::handlers::router(orders.clone())
        .route_layer(from_fn_with_state(jwt.clone(), optional_jwt_auth_middleware));

    let signed_in = Router::new()
        .merge(auth_handlers::account_router(auth))
        .merge(domain_users::handlers::admin_request_router(requests.clone()))
        .merge(domain_orders::handlers::customer_router(orders.clone()))
        .route_layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));

    let admin = Router::new()
        .merge(domain_users::handlers::admin_router(users))
        .merge(domain_users::handlers::admin_request_review_router(requests))
        .merge(domain_categories::handlers::admin_router(categories))
        .merge(domain_products::handlers::admin_router(products))
        .merge(domain_orders::handlers::admin_router(orders))
        .merge(domain_banners::handlers::admin_router(banners))
        .merge(domain_analytics::handlers::admin_router(analytics))
        .nest(
            "/uploads",
            uploads::handlers::router(images, config.uploads.max_bytes),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(jwt, jwt_auth_middleware));

    Router::new()
        .merge(public)
        .merge(checkout)
        .merge(signed_in)
        .nest("/admin", admin)
}
