//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one catch-all handler
//! - Wire up middleware (tracing, limits, request ID, panic guard)
//! - Buffer the request body and hand a `DispatchRequest` to the dispatcher
//! - Bind server to listener and stop on the shutdown signal

use std::future::Future;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::dispatch::{DispatchRequest, Dispatcher};
use crate::http::request::{begin_request, request_id, MakeRequestUuid, X_REQUEST_ID};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

/// HTTP front end for the dispatcher.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `dispatcher` with the listener and
    /// timeout settings of `config`.
    pub fn new(dispatcher: Dispatcher, config: &AppConfig) -> Self {
        let state = AppState {
            dispatcher,
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let max_body_bytes = state.max_body_bytes;
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(middleware::from_fn(begin_request))
            .layer(CatchPanicLayer::new())
            .layer(RequestBodyLimitLayer::new(max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: buffer the body, then dispatch.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let id = request_id(&request).to_string();
    let (parts, body) = request.into_parts();

    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %id, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let request = DispatchRequest {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
    };
    let response = state.dispatcher.dispatch(request);

    tracing::debug!(request_id = %id, status = %response.status(), "Request dispatched");
    response
}
