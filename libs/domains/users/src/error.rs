use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Admins cannot deactivate their own account")]
    CannotDeactivateSelf,

    #[error("Admin request not found: {0}")]
    AdminRequestNotFound(Uuid),

    #[error("A pending admin request already exists")]
    PendingRequestExists,

    #[error("User is already an admin")]
    AlreadyAdmin,

    #[error("Admin request has already been reviewed")]
    AlreadyReviewed,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::AdminRequestNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            UserError::DuplicateEmail(_) | UserError::PendingRequestExists => {
                AppError::Conflict(err.to_string())
            }
            UserError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            UserError::AccountInactive => AppError::Forbidden(err.to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::CannotDeactivateSelf
            | UserError::AlreadyAdmin
            | UserError::AlreadyReviewed => AppError::BadRequest(err.to_string()),
            UserError::PasswordHash(msg) | UserError::Token(msg) => {
                AppError::InternalServerError(msg)
            }
            UserError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}
