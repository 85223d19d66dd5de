//! Products API - REST server over MongoDB

use axum_helpers::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    if config.metrics_enabled {
        observability::init_metrics()?;
    }

    // The database may still be starting; retry only here, never per request
    let mongo_client = database::mongodb::connect_from_config_with_retry(
        &config.mongodb,
        Some(RetryConfig::default()),
    )
    .await?;

    let db = mongo_client.database(config.mongodb.database());
    info!(database = config.mongodb.database(), "Connected to MongoDB");

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
    };

    api::init_indexes(&state).await?;

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &state.config.server)?;
    let app = router.merge(api::health::router(&state));

    info!(
        app = state.config.app.name,
        version = state.config.app.version,
        port = state.config.server.port,
        "Starting Products API"
    );

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed");
        },
    )
    .await?;

    info!("Products API shutdown complete");
    Ok(())
}
