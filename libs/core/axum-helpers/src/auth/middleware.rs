use super::cookie::ACCESS_TOKEN_COOKIE;
use super::jwt::{JwtAuth, JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Bearer token first, then the `access_token` cookie.
pub(crate) fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| cookie_value(cookies, ACCESS_TOKEN_COOKIE))
        })
}

fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Rejects requests without a valid token; inserts [`JwtClaims`] into the
/// request extensions otherwise.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token_from_request(&headers) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return Err(AppError::Unauthorized("No token provided".to_string()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`] but lets anonymous requests through.
///
/// An invalid token is treated as no token, so guest flows keep working
/// with a stale cookie.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(&headers) {
        match auth.verify_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!("Ignoring invalid optional JWT: {}", e),
        }
    }

    next.run(request).await
}

/// Admin gate. Layer it inside [`jwt_auth_middleware`] so claims are present.
pub async fn require_admin(request: Request, next: Next) -> Response {
    let caller = request
        .extensions()
        .get::<JwtClaims>()
        .map(|claims| (claims.sub.clone(), claims.is_admin()));

    match caller {
        None => AppError::Unauthorized("Authentication required".to_string()).into_response(),
        Some((user, false)) => {
            tracing::info!(%user, "Non-admin tried to reach an admin route");
            AppError::Forbidden("Admin access required".to_string()).into_response()
        }
        Some((_, true)) => next.run(request).await,
    }
}
