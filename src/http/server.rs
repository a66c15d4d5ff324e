//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the relay endpoints
//! - Wire up middleware (tracing, request ID, body limit, CORS, timeout)
//! - Bind the server to a listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::bulk::BulkCoordinator;
use crate::config::{RelayConfig, SecurityConfig};
use crate::forward::{Executor, ExecutorBuildError};
use crate::http::{collections, proxy};
use crate::store::SharedRequestStore;

/// Slack between the longest execution deadline and the endpoint timeout,
/// so a timed-out exchange still gets to answer with its own 504 body.
const ENDPOINT_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Executor,
    pub coordinator: BulkCoordinator,
    pub store: SharedRequestStore,
    pub config: Arc<RelayConfig>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: RelayConfig, store: SharedRequestStore) -> Result<Self, ExecutorBuildError> {
        let executor = Executor::from_config(&config)?;
        let coordinator = BulkCoordinator::from_config(executor.clone(), &config.bulk);
        let config = Arc::new(config);

        let state = AppState {
            executor,
            coordinator,
            store,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let endpoint_timeout = Duration::from_millis(
            config
                .bulk
                .batch_deadline_ms
                .unwrap_or(0)
                .max(config.timeouts.max_ms),
        ) + ENDPOINT_GRACE;

        Router::new()
            .route("/health", get(proxy::health))
            .route("/api/proxy", post(proxy::proxy_request))
            .route("/api/proxy/health", get(proxy::proxy_health))
            .route(
                "/api/collections/{id}/requests/bulk-execute",
                post(collections::bulk_execute),
            )
            .route(
                "/api/collections/{id}/requests/{request_id}/execute",
                post(collections::execute_stored),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(endpoint_timeout))
            .layer(cors_layer(&config.security))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown channel fires, then drain in-flight
    /// requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_body_size = self.config.security.max_body_size,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::store::memory::InMemoryStore;

    fn server() -> HttpServer {
        HttpServer::new(RelayConfig::default(), Arc::new(InMemoryStore::new())).unwrap()
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let res = server().router().oneshot(request).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let (status, body) = call(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_failure() {
        let (status, body) = call(post("/api/proxy", "{\"url\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_unknown_collection_is_not_found() {
        let (status, body) = call(post(
            "/api/collections/42/requests/bulk-execute",
            r#"{"requestIds":[1]}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Collection not found");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = call(Request::get("/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
