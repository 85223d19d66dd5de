use super::shutdown::shutdown_signal;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, extract::Request, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Assemble the HTTP surface around the API routes.
///
/// - OpenAPI JSON at `/api-docs/openapi.json`, plus Swagger UI, ReDoc, RapiDoc and Scalar
/// - `apis` nested under `/api`
/// - `Route not found` envelope for unknown paths
/// - request tracing, security headers, compression
/// - CORS, only when `server_config` lists allowed origins
///
/// Routes in `apis` must already have their state applied.
///
/// # Example
/// ```ignore
/// let api_routes = Router::new().nest("/products", domain_products::handlers::router(service));
/// let router = create_router::<ApiDoc>(api_routes, &config.server)?;
/// ```
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    let router = if server_config.cors_allowed_origins.is_empty() {
        info!("CORS_ALLOWED_ORIGIN not set, CORS layer disabled");
        router
    } else {
        info!(
            "CORS configured with allowed origins: {}",
            server_config.cors_allowed_origins.join(",")
        );
        router.layer(create_cors_layer(&server_config.cors_allowed_origins)?)
    };

    Ok(router.layer(CompressionLayer::new()))
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` bounded by `shutdown_timeout`.
///
/// `cleanup` starts only once axum has drained every in-flight request.
///
/// # Example
/// ```ignore
/// let client = state.client.clone();
/// create_production_app(router, &config.server, Duration::from_secs(30), async move {
///     client.shutdown().await;
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    serve_then_cleanup(listener, router, shutdown_signal(), shutdown_timeout, cleanup).await
}

/// Trailing slashes are trimmed before routing, so `/api/items/` reaches the same route as `/api/items`.
fn with_trailing_slash_trimmed(router: Router) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router)
}

async fn serve_then_cleanup<S, F>(
    listener: TcpListener,
    router: Router,
    signal: S,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let app = with_trailing_slash_trimmed(router);
    let serve_result = axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(signal)
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::{Notify, oneshot};
    use tower::ServiceExt;

    #[derive(OpenApi)]
    #[openapi(info(title = "test"))]
    struct EmptyDoc;

    fn app(config: &ServerConfig) -> Router {
        let apis = Router::new().route("/ping", get(|| async { "pong" }));
        create_router::<EmptyDoc>(apis, config).unwrap()
    }

    #[tokio::test]
    async fn test_api_routes_are_nested() {
        let response = app(&ServerConfig::default())
            .oneshot(Request::get("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_returns_envelope() {
        let response = app(&ServerConfig::default())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "message": "Route not found" })
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_reaches_nested_root() {
        let items = Router::new().route("/", get(|| async { "list" }));
        let apis = Router::new().nest("/items", items);
        let app = with_trailing_slash_trimmed(
            create_router::<EmptyDoc>(apis, &ServerConfig::default()).unwrap(),
        );

        for uri in ["/api/items", "/api/items/"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_openapi_json_is_served() {
        let response = app(&ServerConfig::default())
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let config = ServerConfig::default().with_cors_origins(["http://localhost:5173"]);
        let response = app(&config)
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/ping")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_cleanup_runs_after_in_flight_requests_finish() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let started = Arc::new(Notify::new());

        let router = {
            let events = events.clone();
            let started = started.clone();
            Router::new().route(
                "/slow",
                get(move || {
                    let events = events.clone();
                    let started = started.clone();
                    async move {
                        started.notify_one();
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        events.lock().unwrap().push("request");
                        "done"
                    }
                }),
            )
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let cleanup_events = events.clone();

        let server = tokio::spawn(serve_then_cleanup(
            listener,
            router,
            async move {
                stop_rx.await.ok();
            },
            Duration::from_secs(5),
            async move {
                cleanup_events.lock().unwrap().push("cleanup");
            },
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        started.notified().await;
        stop_tx.send(()).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));

        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(*events.lock().unwrap(), vec!["request", "cleanup"]);
    }
}
