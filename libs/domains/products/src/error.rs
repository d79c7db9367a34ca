use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_categories::CategoryError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Product not found: {0}")]
    SlugNotFound(String),

    #[error("Variant {size}/{color} not found on product {product_id}")]
    VariantNotFound {
        product_id: Uuid,
        size: String,
        color: String,
    },

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Slug '{0}' is already in use")]
    DuplicateSlug(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Insufficient stock for {name} ({size}/{color}): requested {requested}")]
    InsufficientStock {
        name: String,
        size: String,
        color: String,
        requested: i32,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_)
            | ProductError::SlugNotFound(_)
            | ProductError::VariantNotFound { .. } => AppError::NotFound(err.to_string()),
            ProductError::DuplicateSlug(_) => AppError::Conflict(err.to_string()),
            ProductError::CategoryNotFound(_) | ProductError::InsufficientStock { .. } => {
                AppError::BadRequest(err.to_string())
            }
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Database(msg) | ProductError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

impl From<CategoryError> for ProductError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::Database(msg) => ProductError::Database(msg),
            other => ProductError::Internal(other.to_string()),
        }
    }
}
