pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1007,
///   "error": "CONFLICT",
///   "message": "Email is already registered",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details, e.g. validation field errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type rendered as an [`ErrorResponse`].
///
/// Domain crates convert their own errors into this type. Server-side
/// failures are logged with their cause and answered with a generic message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query string error: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Path error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn into_parts(self) -> (ErrorCode, String, Option<serde_json::Value>) {
        match self {
            AppError::SerdeJson(e) => internal(ErrorCode::InternalError, &e),
            AppError::Database(e) => map_mongo_error(&e),
            AppError::Io(e) => internal(ErrorCode::StorageError, &e),
            AppError::JsonExtractorRejection(e) => {
                tracing::info!(error_code = ErrorCode::InvalidJson.code(), "JSON rejection: {}", e);
                (ErrorCode::InvalidJson, e.body_text(), None)
            }
            AppError::QueryRejection(e) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Query rejection: {}", e);
                (ErrorCode::BadRequest, e.body_text(), None)
            }
            AppError::PathRejection(e) => {
                tracing::info!(error_code = ErrorCode::BadRequest.code(), "Path rejection: {}", e);
                (ErrorCode::BadRequest, e.body_text(), None)
            }
            AppError::ValidationError(e) => {
                tracing::info!(
                    error_code = ErrorCode::ValidationError.code(),
                    "Validation error: {}",
                    e
                );
                (
                    ErrorCode::ValidationError,
                    ErrorCode::ValidationError.default_message().to_string(),
                    serde_json::to_value(&e).ok(),
                )
            }
            AppError::UuidError(e) => {
                tracing::info!(error_code = ErrorCode::InvalidUuid.code(), "UUID error: {}", e);
                (
                    ErrorCode::InvalidUuid,
                    ErrorCode::InvalidUuid.default_message().to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => client(ErrorCode::BadRequest, msg),
            AppError::Unauthorized(msg) => client(ErrorCode::Unauthorized, msg),
            AppError::Forbidden(msg) => client(ErrorCode::Forbidden, msg),
            AppError::NotFound(msg) => client(ErrorCode::NotFound, msg),
            AppError::Conflict(msg) => client(ErrorCode::Conflict, msg),
            AppError::PayloadTooLarge(msg) => client(ErrorCode::PayloadTooLarge, msg),
            AppError::UnsupportedMediaType(msg) => client(ErrorCode::UnsupportedMediaType, msg),
            AppError::Storage(msg) => internal(ErrorCode::StorageError, &msg),
            AppError::InternalServerError(msg) => internal(ErrorCode::InternalError, &msg),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!(
                    error_code = ErrorCode::ServiceUnavailable.code(),
                    "Service unavailable: {}",
                    msg
                );
                (ErrorCode::ServiceUnavailable, msg, None)
            }
        }
    }
}

fn client(code: ErrorCode, message: String) -> (ErrorCode, String, Option<serde_json::Value>) {
    tracing::info!(error_code = code.code(), "{}: {}", code, message);
    (code, message, None)
}

/// Log the cause, hide it from the client.
fn internal(
    code: ErrorCode,
    cause: &dyn std::fmt::Display,
) -> (ErrorCode, String, Option<serde_json::Value>) {
    tracing::error!(error_code = code.code(), "{}: {}", code, cause);
    (code, code.default_message().to_string(), None)
}

fn map_mongo_error(error: &mongodb::error::Error) -> (ErrorCode, String, Option<serde_json::Value>) {
    if database::mongodb::is_duplicate_key(error) {
        tracing::info!(
            error_code = ErrorCode::DuplicateKey.code(),
            "Duplicate key: {}",
            error
        );
        return (
            ErrorCode::DuplicateKey,
            ErrorCode::DuplicateKey.default_message().to_string(),
            None,
        );
    }
    internal(ErrorCode::DatabaseError, error)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message, details) = self.into_parts();
        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (code.status(), body).into_response()
    }
}

/// Build an error response outside of handler `Result`s, e.g. in middleware.
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Validate)]
    struct Signup {
        #[validate(email)]
        email: String,
    }

    #[tokio::test]
    async fn test_validation_error_includes_field_details() {
        let errors = Signup {
            email: "nope".to_string(),
        }
        .validate()
        .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["code"], 1001);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert!(json["details"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response =
            AppError::InternalServerError("connection string leaked".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let response = AppError::Conflict("Email is already registered".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["error"], "CONFLICT");
        assert_eq!(json["message"], "Email is already registered");
        assert!(json.get("details").is_none());
    }
}
