//! # Axum Helpers
//!
//! Shared HTTP plumbing for the products service.
//!
//! - **[`envelope`]**: the `{success, message, data, count, errors}` response wrapper
//! - **[`errors`]**: [`AppError`], the single failure-to-response translation
//! - **[`extractors`]**: [`JsonBody`], JSON extraction with envelope rejections
//! - **[`http`]**: CORS and security headers
//! - **[`server`]**: router assembly with OpenAPI UIs, health checks, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let config = ServerConfig::default();
//! let router = create_router::<ApiDoc>(Router::new(), &config)?;
//! create_production_app(router, &config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod envelope;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use envelope::{Envelope, ErrorEnvelope, Reply};
pub use errors::{AppError, ErrorCode, VALIDATION_FAILED, validation_messages};
pub use extractors::JsonBody;
pub use http::{create_cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
