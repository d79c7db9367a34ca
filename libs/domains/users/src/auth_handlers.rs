//! Registration, login and the caller's own profile

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, AuthUser, JwtAuth, ValidatedJson,
    auth::{access_token_cookie, clear_access_token_cookie},
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;

use crate::error::UserError;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfile,
    UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// State shared by the auth handlers
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
    /// Adds `Secure` to the session cookie
    pub secure_cookies: bool,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt: self.jwt.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

/// `/auth/register`, `/auth/login`, `/auth/logout`
pub fn public_router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .with_state(Arc::new(state))
}

/// `/auth/me` routes; mount behind the JWT middleware
pub fn account_router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/auth/me", get(me).put(update_me))
        .route("/auth/me/password", put(change_password))
        .with_state(Arc::new(state))
}

/// Issue a token for `user` and wrap it with the session cookie
fn session_response<R: UserRepository>(
    state: &AuthState<R>,
    status: StatusCode,
    user: UserResponse,
) -> Result<Response, AppError> {
    let token = state
        .jwt
        .create_token(
            user.id,
            &user.email,
            &format!("{} {}", user.first_name, user.last_name),
            &[user.role.to_string()],
        )
        .map_err(|e| UserError::Token(e.to_string()))?;

    let cookie = access_token_cookie(&token, state.jwt.ttl(), state.secure_cookies)?;

    Ok((
        status,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(AuthResponse { token, user }),
    )
        .into_response())
}

/// Register a customer account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub(crate) async fn register<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<Response, AppError> {
    let user = state.service.register(input).await?;
    tracing::info!(user_id = %user.id, "Customer registered");
    session_response(&state, StatusCode::CREATED, user)
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub(crate) async fn login<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state
        .service
        .authenticate(&input.email, &input.password)
        .await?;
    session_response(&state, StatusCode::OK, user)
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 204, description = "Session cookie cleared"))
)]
pub(crate) async fn logout<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
) -> Result<Response, AppError> {
    let cookie = clear_access_token_cookie(state.secure_cookies)?;
    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
    )
        .into_response())
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    )
)]
pub(crate) async fn me<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.service.profile(claims.user_id()?).await?;
    Ok(Json(user))
}

/// Update name, phone or address
#[utoipa::path(
    put,
    path = "/auth/me",
    tag = "Auth",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
pub(crate) async fn update_me<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .service
        .update_profile(claims.user_id()?, input)
        .await?;
    Ok(Json(user))
}

/// Change password; the current one is required
#[utoipa::path(
    put,
    path = "/auth/me/password",
    tag = "Auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
pub(crate) async fn change_password<R: UserRepository>(
    State(state): State<Arc<AuthState<R>>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .change_password(claims.user_id()?, &input.current_password, &input.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
