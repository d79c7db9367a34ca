//! HTTP handlers for the Products API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    Paginated, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, LimitQuery, LowStockQuery, Product, ProductFilter, ProductSort,
    SetVariantStock, UpdateProduct, Variant,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        featured_products,
        get_product,
        get_product_by_slug,
        related_products,
        admin_list_products,
        admin_get_product,
        create_product,
        update_product,
        delete_product,
        set_variant_stock,
        low_stock_products,
    ),
    components(
        schemas(
            Product,
            Variant,
            CreateProduct,
            UpdateProduct,
            SetVariantStock,
            ProductSort,
            Paginated<Product>
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Catalog and stock")
    )
)]
pub struct ApiDoc;

/// Public `/products` routes
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/featured", get(featured_products))
        .route("/products/slug/{slug}", get(get_product_by_slug))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/related", get(related_products))
        .with_state(Arc::new(service))
}

/// Admin `/products` routes; nest under `/admin`
pub fn admin_router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    Router::new()
        .route("/products", get(admin_list_products).post(create_product))
        .route("/products/low-stock", get(low_stock_products))
        .route(
            "/products/{id}",
            get(admin_get_product)
                .put(update_product)
                .delete(delete_product),
        )
        .route("/products/{id}/stock", patch(set_variant_stock))
        .with_state(Arc::new(service))
}

/// Active products, filtered and paginated
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "One page of products", body = Paginated<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(filter): Query<ProductFilter>,
) -> ProductResult<Json<Paginated<Product>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    get,
    path = "/products/featured",
    tag = "Products",
    params(LimitQuery),
    responses(
        (status = 200, description = "Featured products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn featured_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<LimitQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.featured(query.limit).await?))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.get_active(id).await?))
}

#[utoipa::path(
    get,
    path = "/products/slug/{slug}",
    tag = "Products",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_product_by_slug<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(slug): Path<String>,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.get_active_by_slug(&slug).await?))
}

/// Other active products from the same category
#[utoipa::path(
    get,
    path = "/products/{id}/related",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "Related products", body = Vec<Product>),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn related_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    Query(query): Query<LimitQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.related(id, query.limit).await?))
}

/// All products, inactive included unless filtered
#[utoipa::path(
    get,
    path = "/admin/products",
    tag = "Products",
    params(ProductFilter),
    responses(
        (status = 200, description = "One page of products", body = Paginated<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn admin_list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(filter): Query<ProductFilter>,
) -> ProductResult<Json<Paginated<Product>>> {
    Ok(Json(service.list_all(filter).await?))
}

#[utoipa::path(
    get,
    path = "/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn admin_get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/products",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.update(id, input).await?))
}

/// Soft delete
#[utoipa::path(
    delete,
    path = "/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deactivated", body = Product),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.delete(id).await?))
}

/// Set the stock of one (size, color) variant
#[utoipa::path(
    patch,
    path = "/admin/products/{id}/stock",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = SetVariantStock,
    responses(
        (status = 200, description = "Stock updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn set_variant_stock<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<SetVariantStock>,
) -> ProductResult<Json<Product>> {
    Ok(Json(service.set_variant_stock(id, input).await?))
}

#[utoipa::path(
    get,
    path = "/admin/products/low-stock",
    tag = "Products",
    params(LowStockQuery),
    responses(
        (status = 200, description = "Products at or below the threshold", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn low_stock_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<LowStockQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.low_stock(query).await?))
}
