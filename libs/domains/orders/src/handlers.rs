//! HTTP handlers for the Orders API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, AuthUser, MaybeAuthUser, Paginated, UuidPath, ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{
    CreateOrder, CustomerInfo, Order, OrderFilter, OrderItem, OrderLineInput, OrderStatus,
    PageQuery, PaymentMethod, PaymentStatus, ShippingAddress, StatusChange, TrackQuery,
    UpdateOrderStatus, UpdatePaymentStatus, Viewer,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

/// OpenAPI documentation for the Orders API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_order,
        track_order,
        my_orders,
        get_order,
        cancel_order,
        admin_list_orders,
        admin_get_order,
        update_order_status,
        update_payment_status,
    ),
    components(
        schemas(
            Order,
            OrderItem,
            OrderStatus,
            PaymentMethod,
            PaymentStatus,
            CustomerInfo,
            ShippingAddress,
            StatusChange,
            CreateOrder,
            OrderLineInput,
            UpdateOrderStatus,
            UpdatePaymentStatus,
            Paginated<Order>
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Orders", description = "Checkout, tracking and fulfilment")
    )
)]
pub struct ApiDoc;

/// Checkout and guest tracking. Layer with the optional JWT middleware so
/// signed-in customers get the order attached to their account.
pub fn router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/track/{order_number}", get(track_order))
        .with_state(Arc::new(service))
}

/// Signed-in customer routes; requires the JWT middleware
pub fn customer_router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    Router::new()
        .route("/orders/mine", get(my_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .with_state(Arc::new(service))
}

/// Admin `/orders` routes; nest under `/admin`
pub fn admin_router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    Router::new()
        .route("/orders", get(admin_list_orders))
        .route("/orders/{id}", get(admin_get_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/orders/{id}/payment", put(update_payment_status))
        .with_state(Arc::new(service))
}

/// Place an order, as a guest or signed in
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    MaybeAuthUser(claims): MaybeAuthUser,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.map(|c| c.user_id()).transpose()?;
    let order = service.create(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Look up an order by number and checkout email
#[utoipa::path(
    get,
    path = "/orders/track/{order_number}",
    tag = "Orders",
    params(
        ("order_number" = String, Path, description = "Order number, e.g. CMD-250307-48213"),
        TrackQuery
    ),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn track_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Path(order_number): Path<String>,
    ValidatedQuery(query): ValidatedQuery<TrackQuery>,
) -> OrderResult<Json<Order>> {
    Ok(Json(service.track(&order_number, &query.email).await?))
}

#[utoipa::path(
    get,
    path = "/orders/mine",
    tag = "Orders",
    params(PageQuery),
    responses(
        (status = 200, description = "Own orders, newest first", body = Paginated<Order>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn my_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    AuthUser(claims): AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<Order>>, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(service.list_mine(user_id, page).await?))
}

/// Own order, or any order for admins
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    let viewer = Viewer {
        user_id: claims.user_id()?,
        is_admin: claims.is_admin(),
    };
    Ok(Json(service.get_for(id, viewer).await?))
}

/// Cancel an own order while it is still pending
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled", body = Order),
        (status = 400, description = "Order is no longer pending"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn cancel_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(service.cancel_own(id, user_id).await?))
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    tag = "Orders",
    params(OrderFilter),
    responses(
        (status = 200, description = "One page of orders", body = Paginated<Order>),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn admin_list_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Query(filter): Query<OrderFilter>,
) -> OrderResult<Json<Paginated<Order>>> {
    Ok(Json(service.list(filter).await?))
}

#[utoipa::path(
    get,
    path = "/admin/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn admin_get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<Order>> {
    Ok(Json(service.get(id).await?))
}

/// Move an order along its lifecycle
#[utoipa::path(
    put,
    path = "/admin/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Status changed", body = Order),
        (status = 400, description = "Transition not allowed"),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_order_status<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOrderStatus>,
) -> Result<Json<Order>, AppError> {
    let admin_id = claims.user_id()?;
    Ok(Json(service.update_status(id, input, admin_id).await?))
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/payment",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdatePaymentStatus,
    responses(
        (status = 200, description = "Payment status changed", body = Order),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_payment_status<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdatePaymentStatus>,
) -> OrderResult<Json<Order>> {
    Ok(Json(service.update_payment(id, input).await?))
}
