//! HTTP handlers for the admin Analytics API

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use axum_helpers::errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse};
use domain_orders::Order;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::AnalyticsResult;
use crate::models::{DailySales, DashboardStats, LimitQuery, SalesQuery, StatusCount, TopProduct};
use crate::repository::AnalyticsRepository;
use crate::service::AnalyticsService;

/// OpenAPI documentation for the Analytics API
#[derive(OpenApi)]
#[openapi(
    paths(dashboard, sales, top_products, orders_by_status, recent_orders),
    components(
        schemas(DashboardStats, DailySales, TopProduct, StatusCount),
        responses(BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Analytics", description = "Admin dashboard figures")
    )
)]
pub struct ApiDoc;

/// Admin `/analytics` routes; nest under `/admin`
pub fn admin_router<R: AnalyticsRepository + 'static>(service: AnalyticsService<R>) -> Router {
    Router::new()
        .route("/analytics/dashboard", get(dashboard))
        .route("/analytics/sales", get(sales))
        .route("/analytics/top-products", get(top_products))
        .route("/analytics/orders-by-status", get(orders_by_status))
        .route("/analytics/recent-orders", get(recent_orders))
        .with_state(Arc::new(service))
}

#[utoipa::path(
    get,
    path = "/admin/analytics/dashboard",
    tag = "Analytics",
    responses(
        (status = 200, description = "Dashboard totals", body = DashboardStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn dashboard<R: AnalyticsRepository>(
    State(service): State<Arc<AnalyticsService<R>>>,
) -> AnalyticsResult<Json<DashboardStats>> {
    Ok(Json(service.dashboard().await?))
}

/// Revenue and order count per day
#[utoipa::path(
    get,
    path = "/admin/analytics/sales",
    tag = "Analytics",
    params(SalesQuery),
    responses(
        (status = 200, description = "Daily sales, oldest first", body = Vec<DailySales>),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn sales<R: AnalyticsRepository>(
    State(service): State<Arc<AnalyticsService<R>>>,
    Query(query): Query<SalesQuery>,
) -> AnalyticsResult<Json<Vec<DailySales>>> {
    Ok(Json(service.sales(query).await?))
}

#[utoipa::path(
    get,
    path = "/admin/analytics/top-products",
    tag = "Analytics",
    params(LimitQuery),
    responses(
        (status = 200, description = "Best sellers by quantity", body = Vec<TopProduct>),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn top_products<R: AnalyticsRepository>(
    State(service): State<Arc<AnalyticsService<R>>>,
    Query(query): Query<LimitQuery>,
) -> AnalyticsResult<Json<Vec<TopProduct>>> {
    Ok(Json(service.top_products(query).await?))
}

#[utoipa::path(
    get,
    path = "/admin/analytics/orders-by-status",
    tag = "Analytics",
    responses(
        (status = 200, description = "Order count per status", body = Vec<StatusCount>)
    )
)]
async fn orders_by_status<R: AnalyticsRepository>(
    State(service): State<Arc<AnalyticsService<R>>>,
) -> AnalyticsResult<Json<Vec<StatusCount>>> {
    Ok(Json(service.orders_by_status().await?))
}

#[utoipa::path(
    get,
    path = "/admin/analytics/recent-orders",
    tag = "Analytics",
    params(LimitQuery),
    responses(
        (status = 200, description = "Latest orders", body = Vec<Order>),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn recent_orders<R: AnalyticsRepository>(
    State(service): State<Arc<AnalyticsService<R>>>,
    Query(query): Query<LimitQuery>,
) -> AnalyticsResult<Json<Vec<Order>>> {
    Ok(Json(service.recent_orders(query).await?))
}
