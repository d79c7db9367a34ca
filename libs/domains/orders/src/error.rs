use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_products::ProductError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Order not found: {0}")]
    NumberNotFound(String),

    #[error("You do not have access to this order")]
    Forbidden,

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Only pending orders can be cancelled (order is {0})")]
    NotCancellable(OrderStatus),

    #[error("Order was modified concurrently, retry")]
    Conflict,

    #[error("Product is not available: {0}")]
    ProductUnavailable(Uuid),

    #[error("Variant {size}/{color} of {name} is not available")]
    VariantUnavailable {
        name: String,
        size: String,
        color: String,
    },

    #[error("{0}")]
    InsufficientStock(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Insert hit the unique index on `order_number`
    #[error("Order number {0} is already taken")]
    DuplicateOrderNumber(String),

    #[error("Could not allocate a unique order number after {0} attempts")]
    OrderNumberExhausted(u32),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) | OrderError::NumberNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            OrderError::Forbidden => AppError::Forbidden(err.to_string()),
            OrderError::Conflict => AppError::Conflict(err.to_string()),
            OrderError::InvalidTransition { .. }
            | OrderError::NotCancellable(_)
            | OrderError::ProductUnavailable(_)
            | OrderError::VariantUnavailable { .. }
            | OrderError::InsufficientStock(_) => AppError::BadRequest(err.to_string()),
            OrderError::Validation(msg) => AppError::BadRequest(msg),
            OrderError::DuplicateOrderNumber(_) | OrderError::OrderNumberExhausted(_) => {
                AppError::InternalServerError(err.to_string())
            }
            OrderError::Database(msg) | OrderError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for OrderError {
    fn from(err: mongodb::error::Error) -> Self {
        OrderError::Database(err.to_string())
    }
}

impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::ProductUnavailable(id),
            ProductError::InsufficientStock { .. } => OrderError::InsufficientStock(err.to_string()),
            ProductError::Validation(msg) => OrderError::Validation(msg),
            ProductError::Database(msg) => OrderError::Database(msg),
            other => OrderError::Internal(other.to_string()),
        }
    }
}
