//! HTTP handlers for the Banners API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::BannerResult;
use crate::models::{
    Banner, BannerFilter, BannerPlacement, CreateBanner, LiveBannerQuery, UpdateBanner,
};
use crate::repository::BannerRepository;
use crate::service::BannerService;

/// OpenAPI documentation for the Banners API
#[derive(OpenApi)]
#[openapi(
    paths(live_banners, admin_list_banners, create_banner, update_banner, delete_banner),
    components(
        schemas(Banner, BannerPlacement, CreateBanner, UpdateBanner),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Banners", description = "Storefront banners")
    )
)]
pub struct ApiDoc;

pub fn router<R: BannerRepository + 'static>(service: BannerService<R>) -> Router {
    Router::new()
        .route("/banners", get(live_banners))
        .with_state(Arc::new(service))
}

/// Admin `/banners` routes; nest under `/admin`
pub fn admin_router<R: BannerRepository + 'static>(service: BannerService<R>) -> Router {
    Router::new()
        .route("/banners", get(admin_list_banners).post(create_banner))
        .route("/banners/{id}", put(update_banner).delete(delete_banner))
        .with_state(Arc::new(service))
}

/// Banners currently on display, in `sort_order`
#[utoipa::path(
    get,
    path = "/banners",
    tag = "Banners",
    params(LiveBannerQuery),
    responses(
        (status = 200, description = "Live banners", body = Vec<Banner>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn live_banners<R: BannerRepository>(
    State(service): State<Arc<BannerService<R>>>,
    Query(query): Query<LiveBannerQuery>,
) -> BannerResult<Json<Vec<Banner>>> {
    Ok(Json(service.live(query).await?))
}

#[utoipa::path(
    get,
    path = "/admin/banners",
    tag = "Banners",
    params(BannerFilter),
    responses(
        (status = 200, description = "All banners", body = Vec<Banner>)
    )
)]
async fn admin_list_banners<R: BannerRepository>(
    State(service): State<Arc<BannerService<R>>>,
    Query(filter): Query<BannerFilter>,
) -> BannerResult<Json<Vec<Banner>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    post,
    path = "/admin/banners",
    tag = "Banners",
    request_body = CreateBanner,
    responses(
        (status = 201, description = "Banner created", body = Banner),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn create_banner<R: BannerRepository>(
    State(service): State<Arc<BannerService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateBanner>,
) -> BannerResult<impl IntoResponse> {
    let banner = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

#[utoipa::path(
    put,
    path = "/admin/banners/{id}",
    tag = "Banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    request_body = UpdateBanner,
    responses(
        (status = 200, description = "Banner updated", body = Banner),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_banner<R: BannerRepository>(
    State(service): State<Arc<BannerService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateBanner>,
) -> BannerResult<Json<Banner>> {
    Ok(Json(service.update(id, input).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/banners/{id}",
    tag = "Banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 204, description = "Banner deleted"),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_banner<R: BannerRepository>(
    State(service): State<Arc<BannerService<R>>>,
    UuidPath(id): UuidPath,
) -> BannerResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
