use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Validation(msg) => AppError::BadRequest(msg),
            AnalyticsError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for AnalyticsError {
    fn from(err: mongodb::error::Error) -> Self {
        AnalyticsError::Database(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for AnalyticsError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AnalyticsError::Database(format!("Unexpected aggregation result: {err}"))
    }
}
