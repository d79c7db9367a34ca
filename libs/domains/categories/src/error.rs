use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found: {0}")]
    NotFound(Uuid),

    #[error("Category not found: {0}")]
    SlugNotFound(String),

    #[error("Parent category not found: {0}")]
    ParentNotFound(Uuid),

    #[error("A category cannot be its own parent or descendant")]
    CyclicParent,

    #[error("Category has {0} active subcategories")]
    HasActiveChildren(u64),

    #[error("Slug '{0}' is already in use")]
    DuplicateSlug(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CategoryResult<T> = Result<T, CategoryError>;

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(_) | CategoryError::SlugNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            CategoryError::HasActiveChildren(_) | CategoryError::DuplicateSlug(_) => {
                AppError::Conflict(err.to_string())
            }
            CategoryError::ParentNotFound(_) | CategoryError::CyclicParent => {
                AppError::BadRequest(err.to_string())
            }
            CategoryError::Validation(msg) => AppError::BadRequest(msg),
            CategoryError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CategoryError {
    fn from(err: mongodb::error::Error) -> Self {
        CategoryError::Database(err.to_string())
    }
}
