//! The uniform JSON wrapper returned by every endpoint.
//!
//! ```json
//! { "success": true, "count": 2, "data": [ ... ] }
//! { "success": false, "message": "Validation failed", "errors": ["SKU is required"] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// Successful array payload; `count` is always the length of `items`.
    pub fn collection(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::data(items)
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// OpenAPI shape of a failure envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,
    pub message: String,
    /// Present for validation failures, one entry per violated rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// A successful envelope paired with its status code.
///
/// Handlers return `Result<Reply<T>, AppError>`, so success and failure both
/// leave through a single conversion each.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T> Reply<T> {
    /// 200 with a single item
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::data(data),
        }
    }

    /// 201 with the created item and a confirmation message
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope::data(data).with_message(message),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope = self.envelope.with_message(message);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &Envelope<T> {
        &self.envelope
    }
}

impl<T> Reply<Vec<T>> {
    /// 200 with an array and its `count`
    pub fn list(items: Vec<T>) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::collection(items),
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
