//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single fallback handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Dispatch every request to the [`Dispatcher`]
//! - Serve plain TCP or TLS with graceful shutdown

use axum::{
    extract::{ConnectInfo, Request, State},
    response::{IntoResponse, Response},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TimeoutConfig;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::not_found;
use crate::lifecycle::{shutdown, Shutdown};
use crate::observability::metrics;
use crate::routing::{DispatchOutcome, Dispatcher};

/// Time in-flight TLS requests get to finish after shutdown is triggered.
const TLS_DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Client address reported when the connection info is unavailable.
const UNKNOWN_CLIENT: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the mock handlers.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(dispatcher: Arc<Dispatcher>, timeouts: &TimeoutConfig) -> Self {
        let state = AppState { dispatcher };
        Self {
            router: build_router(state, Duration::from_secs(timeouts.request_secs)),
        }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown.subscribe()))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: &Shutdown,
    ) -> std::io::Result<()> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let rx = shutdown.subscribe();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(rx).await;
            drain.graceful_shutdown(Some(TLS_DRAIN_GRACE));
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router(state: AppState, timeout: Duration) -> Router {
    Router::new().fallback(dispatch_handler).with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(timeout)),
    )
}

/// Fallback handler: every method and path goes through the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
        .unwrap_or(UNKNOWN_CLIENT);
    let method = request.method();
    let raw_path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match state
        .dispatcher
        .dispatch(method, raw_path, request.headers(), client)
    {
        DispatchOutcome::Matched(matched) => {
            let response = matched.respond(method, client);
            metrics::record_request(method.as_str(), "matched", start);
            response.into_response()
        }
        DispatchOutcome::NotFound => {
            metrics::record_request(method.as_str(), "not_found", start);
            not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::test_support::handler;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let (dispatcher, skipped) = Dispatcher::from_handlers([
            handler("item", Method::GET, "/items/$$sku$$"),
            handler("root", Method::GET, "/"),
        ]);
        assert_eq!(skipped, 0);
        HttpServer::new(Arc::new(dispatcher), &TimeoutConfig::default())
    }

    async fn send(method: Method, uri: &str) -> Response {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        server().router().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_matched_request() {
        let response = send(Method::GET, "/items/abc123").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_text(response).await, "item");
    }

    #[tokio::test]
    async fn test_root_path() {
        let response = send(Method::GET, "/").await;
        assert_eq!(body_text(response).await, "root");
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = send(Method::POST, "/items/abc123").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not Found");

        let response = send(Method::GET, "/nothing/here").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_served_by_get_handler() {
        let response = send(Method::HEAD, "/items/abc123").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(Method::HEAD, "/nothing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header("x-request-id", "given-id")
            .body(Body::empty())
            .unwrap();
        let response = server().router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "given-id");
    }
}
