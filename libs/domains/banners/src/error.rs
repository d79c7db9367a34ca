use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BannerError {
    #[error("Banner not found: {0}")]
    NotFound(Uuid),

    #[error("Banner must end after it starts")]
    InvalidWindow,

    #[error("Database error: {0}")]
    Database(String),
}

pub type BannerResult<T> = Result<T, BannerError>;

impl From<BannerError> for AppError {
    fn from(err: BannerError) -> Self {
        match err {
            BannerError::NotFound(_) => AppError::NotFound(err.to_string()),
            BannerError::InvalidWindow => AppError::BadRequest(err.to_string()),
            BannerError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for BannerError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for BannerError {
    fn from(err: mongodb::error::Error) -> Self {
        BannerError::Database(err.to_string())
    }
}
