//! # Axum Helpers
//!
//! Shared HTTP plumbing for the Delta Fashion services.
//!
//! - **[`auth`]**: JWT issuing/verification, auth middleware, role gate, extractors
//! - **[`server`]**: router assembly with OpenAPI docs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: [`AppError`] and the JSON [`ErrorResponse`] with [`ErrorCode`]s
//! - **[`extractors`]**: UUID path, validated JSON body and query
//! - **[`pagination`]**: page/limit normalization and [`Paginated`] responses

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod server;

pub use auth::{
    AuthUser, JwtAuth, JwtClaims, JwtConfig, MaybeAuthUser, ROLE_ADMIN, ROLE_CUSTOMER,
    jwt_auth_middleware, optional_jwt_auth_middleware, require_admin,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{CorsConfig, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson, ValidatedQuery};

pub use pagination::{Paginated, Pagination};
