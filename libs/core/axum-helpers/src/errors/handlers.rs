use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::ErrorCode;
use crate::envelope::Envelope;

/// Fallback for paths no router claims.
pub async fn not_found() -> Response {
    tracing::debug!(error_code = ErrorCode::RouteNotFound.code(), "Route not found");
    (StatusCode::NOT_FOUND, Json(Envelope::failure("Route not found"))).into_response()
}
