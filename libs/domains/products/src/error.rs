use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::ProductId;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("'{0}' is not a valid product id")]
    InvalidId(String),

    /// A query parameter or request field is missing, unknown or ill-typed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity invariants violated; carries every offending field
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::InvalidId(raw) => {
                AppError::InvalidId(format!("'{}' is not a valid product id", raw))
            }
            ProductError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ProductError::Forbidden(msg) => AppError::Forbidden(msg),
            ProductError::Database(e) => AppError::Database(e),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
