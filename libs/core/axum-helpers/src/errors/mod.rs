pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use crate::envelope::Envelope;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Message used for every validation failure envelope.
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Application error type, and the only place failures become HTTP responses.
///
/// Every variant renders as an [`Envelope`] with `success: false`. `Internal` keeps
/// its detail for the operator log and never sends it to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{message}: {}", .errors.join("; "))]
    ValidationFailed { message: String, errors: Vec<String> },

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}: {detail}")]
    Internal { message: String, detail: String },
}

impl AppError {
    /// Validation failure with the standard message.
    pub fn validation(errors: Vec<String>) -> Self {
        AppError::ValidationFailed {
            message: VALIDATION_FAILED.to_string(),
            errors,
        }
    }

    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        AppError::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier(_)
            | AppError::ValidationFailed { .. }
            | AppError::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            AppError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            AppError::DuplicateKey(_) => ErrorCode::DuplicateKey,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let envelope = match self {
            AppError::Internal { message, detail } => {
                tracing::error!(error_code = code.code(), %detail, "{}", message);
                Envelope::failure(message)
            }
            AppError::ValidationFailed { message, errors } => {
                tracing::info!(error_code = code.code(), ?errors, "{}", message);
                Envelope::failure(message).with_errors(errors)
            }
            AppError::InvalidIdentifier(message)
            | AppError::DuplicateKey(message)
            | AppError::NotFound(message) => {
                tracing::info!(error_code = code.code(), "{}", message);
                Envelope::failure(message)
            }
        };

        (status, Json(envelope)).into_response()
    }
}

/// A body that is not JSON, or does not fit the payload type, is a validation failure
/// carrying the parser's message.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(vec![rejection.body_text()])
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(vec![rejection.body_text()])
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::validation(validation_messages(&errors))
    }
}

/// Flatten `validator` errors, nested structs and lists included, into sorted messages.
///
/// Rules without an explicit message fall back to `"<field> is invalid"`.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.sort();
    messages.dedup();
    messages
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}
