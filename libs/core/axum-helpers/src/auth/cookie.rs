use axum::http::HeaderValue;
use std::time::Duration;

use crate::errors::AppError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// `Set-Cookie` value carrying the access token. `Secure` only behind HTTPS.
pub fn access_token_cookie(
    token: &str,
    max_age: Duration,
    secure: bool,
) -> Result<HeaderValue, AppError> {
    let secure_flag = if secure { " Secure;" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        ACCESS_TOKEN_COOKIE,
        token,
        secure_flag,
        max_age.as_secs()
    );
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::InternalServerError(format!("Failed to create cookie: {}", e)))
}

/// Expire the access token cookie.
pub fn clear_access_token_cookie(secure: bool) -> Result<HeaderValue, AppError> {
    access_token_cookie("", Duration::ZERO, secure)
}
