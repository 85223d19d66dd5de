//! JSON extractor whose rejection is an [`AppError`] envelope.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// `axum::Json` with failures reported as `ValidationFailed`.
///
/// Field rules are not checked here: payloads are often partial and only become
/// validatable once merged with stored state.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::JsonBody;
///
/// async fn create(JsonBody(payload): JsonBody<ProductPayload>) -> Result<Reply<Product>, AppError> {
///     // ...
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}
