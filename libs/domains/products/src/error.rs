use axum_helpers::{AppError, validation_messages};
use observability::products::Outcome;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::ProductId;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Invalid product ID format")]
    InvalidIdentifier,

    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Product with SKU '{0}' already exists")]
    DuplicateKey(String),

    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("Unexpected storage failure: {0}")]
    Unexpected(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Map onto the HTTP error, using `failure_message` for unexpected failures.
    ///
    /// The storage detail of an unexpected failure is kept for the log only.
    pub fn into_app_error(self, failure_message: &str) -> AppError {
        match self {
            ProductError::InvalidIdentifier => {
                AppError::InvalidIdentifier("Invalid product ID format".to_string())
            }
            ProductError::ValidationFailed(errors) => AppError::validation(errors),
            ProductError::DuplicateKey(_) => {
                AppError::DuplicateKey("Product with this SKU already exists".to_string())
            }
            ProductError::NotFound(_) => AppError::NotFound("Product not found".to_string()),
            ProductError::Unexpected(detail) => AppError::internal(failure_message, detail),
        }
    }

    /// Metrics outcome for this failure
    pub fn outcome(&self) -> Outcome {
        match self {
            ProductError::Unexpected(_) => Outcome::Failed,
            _ => Outcome::Rejected,
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        err.into_app_error("Internal server error")
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Unexpected(err.to_string())
    }
}

impl From<ValidationErrors> for ProductError {
    fn from(errors: ValidationErrors) -> Self {
        ProductError::ValidationFailed(validation_messages(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_client_errors_map_to_fixed_messages() {
        let cases = [
            (ProductError::InvalidIdentifier, StatusCode::BAD_REQUEST, "Invalid product ID format"),
            (
                ProductError::DuplicateKey("W1".into()),
                StatusCode::BAD_REQUEST,
                "Product with this SKU already exists",
            ),
            (
                ProductError::NotFound(ProductId::new()),
                StatusCode::NOT_FOUND,
                "Product not found",
            ),
        ];

        for (err, status, message) in cases {
            let app = err.into_app_error("unused");
            assert_eq!(app.status_code(), status);
            assert_eq!(app.to_string(), message);
        }
    }

    #[test]
    fn test_unexpected_uses_operation_message() {
        let app = ProductError::Unexpected("socket closed".into())
            .into_app_error("Failed to delete product");
        assert_eq!(app.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        match app {
            AppError::Internal { message, detail } => {
                assert_eq!(message, "Failed to delete product");
                assert_eq!(detail, "socket closed");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(ProductError::Unexpected("x".into()).outcome(), Outcome::Failed);
        assert_eq!(ProductError::InvalidIdentifier.outcome(), Outcome::Rejected);
        assert_eq!(ProductError::ValidationFailed(vec![]).outcome(), Outcome::Rejected);
    }
}
