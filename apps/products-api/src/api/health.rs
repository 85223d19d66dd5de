//! Root-level operational endpoints: liveness, readiness and metrics

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, health_router, run_health_checks};
use mongodb::Client;
use observability::metrics_handler;
use serde_json::Value;

use crate::state::AppState;

type ReadyResponse = (StatusCode, Json<Value>);

/// Readiness: 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(client): State<Client>) -> Result<ReadyResponse, ReadyResponse> {
    let probe: HealthCheckFuture<'_> = Box::pin(async move {
        database::mongodb::ping(&client)
            .await
            .map_err(|e| e.to_string())
    });

    run_health_checks(vec![("database", probe)]).await
}

/// `/health`, `/ready` and, when enabled, `/metrics`
pub fn router(state: &AppState) -> Router {
    let router = Router::new()
        .route("/ready", get(ready))
        .with_state(state.mongo_client.clone())
        .merge(health_router(state.config.app));

    if state.config.metrics_enabled {
        router.route("/metrics", get(metrics_handler))
    } else {
        router
    }
}
