//! Authentication and authorization.
//!
//! - Stateless HS256 JWTs carrying the user's roles
//! - Middleware reading the token from `Authorization: Bearer` or the
//!   `access_token` cookie
//! - [`require_admin`] role gate
//! - [`AuthUser`] / [`MaybeAuthUser`] extractors for handlers
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware, require_admin};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let admin = Router::new()
//!     .route("/stats", get(handler))
//!     .layer(axum::middleware::from_fn(require_admin))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod cookie;
pub mod extractors;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use cookie::{ACCESS_TOKEN_COOKIE, access_token_cookie, clear_access_token_cookie};
pub use extractors::{AuthUser, MaybeAuthUser};
pub use jwt::{JwtAuth, JwtClaims, ROLE_ADMIN, ROLE_CUSTOMER};
pub use middleware::{jwt_auth_middleware, optional_jwt_auth_middleware, require_admin};
