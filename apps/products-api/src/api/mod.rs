//! API routes module

pub mod health;
pub mod products;

use axum::{Router, middleware};
use observability::metrics_middleware;

use crate::state::AppState;

/// Routes nested under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .layer(middleware::from_fn(metrics_middleware))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}
