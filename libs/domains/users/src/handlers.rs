//! HTTP handlers for user administration and admin requests

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuthUser, Paginated, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    Address, AdminRequest, AdminRequestFilter, AdminRequestStatus, AdminUpdateUser,
    AuthResponse, ChangePasswordRequest, CreateAdminRequest, LoginRequest, RegisterRequest,
    ReviewAdminRequest, Role, UpdateProfile, UserFilter, UserResponse,
};
use crate::repository::{AdminRequestRepository, UserRepository};
use crate::service::{AdminRequestService, UserService};

/// OpenAPI documentation for auth, users and admin requests
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth_handlers::register,
        crate::auth_handlers::login,
        crate::auth_handlers::logout,
        crate::auth_handlers::me,
        crate::auth_handlers::update_me,
        crate::auth_handlers::change_password,
        list_users,
        get_user,
        update_user,
        deactivate_user,
        submit_admin_request,
        my_admin_requests,
        list_admin_requests,
        approve_admin_request,
        reject_admin_request,
    ),
    components(
        schemas(
            UserResponse, Role, Address, RegisterRequest, LoginRequest, AuthResponse,
            UpdateProfile, ChangePasswordRequest, AdminUpdateUser, UserFilter,
            AdminRequest, AdminRequestStatus, CreateAdminRequest, ReviewAdminRequest,
            Paginated<UserResponse>
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Users", description = "User administration"),
        (name = "Admin Requests", description = "Requests for admin access")
    )
)]
pub struct ApiDoc;

/// `/users` admin routes; nest under `/admin`
pub fn admin_router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(deactivate_user),
        )
        .with_state(Arc::new(service))
}

/// Customer side of admin requests; mount behind the JWT middleware
pub fn admin_request_router<A, R>(service: AdminRequestService<A, R>) -> Router
where
    A: AdminRequestRepository + 'static,
    R: UserRepository + 'static,
{
    Router::new()
        .route("/admin-requests", post(submit_admin_request))
        .route("/admin-requests/mine", get(my_admin_requests))
        .with_state(Arc::new(service))
}

/// Review side of admin requests; nest under `/admin`
pub fn admin_request_review_router<A, R>(service: AdminRequestService<A, R>) -> Router
where
    A: AdminRequestRepository + 'static,
    R: UserRepository + 'static,
{
    Router::new()
        .route("/admin-requests", get(list_admin_requests))
        .route("/admin-requests/{id}/approve", post(approve_admin_request))
        .route("/admin-requests/{id}/reject", post(reject_admin_request))
        .with_state(Arc::new(service))
}

/// List users
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "One page of users", body = Paginated<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Paginated<UserResponse>>, AppError> {
    Ok(Json(service.list_users(filter).await?))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(service.get_user(id).await?))
}

/// Update names, role or active flag
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AdminUpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = service
        .admin_update_user(claims.user_id()?, id, input)
        .await?;
    Ok(Json(user))
}

/// Deactivate a user (soft delete)
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = UserResponse),
        (status = 400, description = "Admins cannot deactivate themselves"),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn deactivate_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
) -> Result<Json<UserResponse>, AppError> {
    let user = service.deactivate_user(claims.user_id()?, id).await?;
    Ok(Json(user))
}

/// Ask for admin access
#[utoipa::path(
    post,
    path = "/admin-requests",
    tag = "Admin Requests",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Request submitted", body = AdminRequest),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn submit_admin_request<A: AdminRequestRepository, R: UserRepository>(
    State(service): State<Arc<AdminRequestService<A, R>>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = service.submit(claims.user_id()?, input).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// The caller's own requests
#[utoipa::path(
    get,
    path = "/admin-requests/mine",
    tag = "Admin Requests",
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<AdminRequest>),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn my_admin_requests<A: AdminRequestRepository, R: UserRepository>(
    State(service): State<Arc<AdminRequestService<A, R>>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<AdminRequest>>, AppError> {
    Ok(Json(service.list_mine(claims.user_id()?).await?))
}

/// List admin requests
#[utoipa::path(
    get,
    path = "/admin/admin-requests",
    tag = "Admin Requests",
    params(AdminRequestFilter),
    responses(
        (status = 200, description = "Requests, newest first", body = Vec<AdminRequest>),
        (status = 403, response = ForbiddenResponse)
    )
)]
async fn list_admin_requests<A: AdminRequestRepository, R: UserRepository>(
    State(service): State<Arc<AdminRequestService<A, R>>>,
    Query(filter): Query<AdminRequestFilter>,
) -> Result<Json<Vec<AdminRequest>>, AppError> {
    Ok(Json(service.list(filter).await?))
}

/// Approve a pending request and promote the requester
#[utoipa::path(
    post,
    path = "/admin/admin-requests/{id}/approve",
    tag = "Admin Requests",
    params(("id" = Uuid, Path, description = "Admin request ID")),
    request_body = ReviewAdminRequest,
    responses(
        (status = 200, description = "Request approved", body = AdminRequest),
        (status = 400, description = "Request already reviewed"),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn approve_admin_request<A: AdminRequestRepository, R: UserRepository>(
    State(service): State<Arc<AdminRequestService<A, R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
    input: Option<Json<ReviewAdminRequest>>,
) -> Result<Json<AdminRequest>, AppError> {
    let input = review_input(input)?;
    Ok(Json(service.approve(claims.user_id()?, id, input).await?))
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/admin/admin-requests/{id}/reject",
    tag = "Admin Requests",
    params(("id" = Uuid, Path, description = "Admin request ID")),
    request_body = ReviewAdminRequest,
    responses(
        (status = 200, description = "Request rejected", body = AdminRequest),
        (status = 400, description = "Request already reviewed"),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn reject_admin_request<A: AdminRequestRepository, R: UserRepository>(
    State(service): State<Arc<AdminRequestService<A, R>>>,
    AuthUser(claims): AuthUser,
    UuidPath(id): UuidPath,
    input: Option<Json<ReviewAdminRequest>>,
) -> Result<Json<AdminRequest>, AppError> {
    let input = review_input(input)?;
    Ok(Json(service.reject(claims.user_id()?, id, input).await?))
}

/// The review body is optional
fn review_input(input: Option<Json<ReviewAdminRequest>>) -> Result<ReviewAdminRequest, AppError> {
    use validator::Validate;

    let input = input.map(|Json(body)| body).unwrap_or_default();
    input.validate()?;
    Ok(input)
}
