//! Reusable OpenAPI response types for the failure envelopes.

use crate::envelope::ErrorEnvelope;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Malformed identifier in the path",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Invalid product ID format"
    })
)]
pub struct InvalidIdentifierResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "One or more field rules were violated",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Validation failed",
        "errors": ["Price cannot be negative", "SKU is required"]
    })
)]
pub struct ValidationFailedResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Unique key already taken",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Product with this SKU already exists"
    })
)]
pub struct DuplicateKeyResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Product not found"
    })
)]
pub struct NotFoundResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "success": false,
        "message": "Failed to fetch products"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorEnvelope);
