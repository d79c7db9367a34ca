//! HTTP handlers for the Categories API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CategoryResult;
use crate::models::{Category, CategoryFilter, CategoryNode, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

/// OpenAPI documentation for the Categories API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        category_tree,
        get_category,
        get_category_by_slug,
        admin_list_categories,
        create_category,
        update_category,
        delete_category,
    ),
    components(
        schemas(Category, CategoryNode, CreateCategory, UpdateCategory, CategoryFilter),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Categories", description = "Category tree")
    )
)]
pub struct ApiDoc;

/// Public `/categories` routes
pub fn router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/tree", get(category_tree))
        .route("/categories/slug/{slug}", get(get_category_by_slug))
        .route("/categories/{id}", get(get_category))
        .with_state(Arc::new(service))
}

/// Admin `/categories` routes; nest under `/admin`
pub fn admin_router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(admin_list_categories).post(create_category),
        )
        .route(
            "/categories/{id}",
            axum::routing::put(update_category).delete(delete_category),
        )
        .with_state(Arc::new(service))
}

/// Active categories, flat
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Active categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
) -> CategoryResult<Json<Vec<Category>>> {
    Ok(Json(service.list_active().await?))
}

/// Active categories as a tree
#[utoipa::path(
    get,
    path = "/categories/tree",
    tag = "Categories",
    responses(
        (status = 200, description = "Category forest", body = Vec<CategoryNode>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn category_tree<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
) -> CategoryResult<Json<Vec<CategoryNode>>> {
    Ok(Json(service.tree().await?))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Category>> {
    Ok(Json(service.get_active(id).await?))
}

#[utoipa::path(
    get,
    path = "/categories/slug/{slug}",
    tag = "Categories",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_category_by_slug<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Path(slug): Path<String>,
) -> CategoryResult<Json<Category>> {
    Ok(Json(service.get_active_by_slug(&slug).await?))
}

/// All categories, inactive included
#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = "Categories",
    params(CategoryFilter),
    responses(
        (status = 200, description = "Categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    Query(filter): Query<CategoryFilter>,
) -> CategoryResult<Json<Vec<Category>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "Categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CategoryResult<impl IntoResponse> {
    let category = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CategoryResult<Json<Category>> {
    Ok(Json(service.update(id, input).await?))
}

/// Soft delete; refused while active subcategories exist
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deactivated", body = Category),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Category>> {
    Ok(Json(service.delete(id).await?))
}
