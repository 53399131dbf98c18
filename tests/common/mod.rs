//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use mvc_dispatch::config::AppConfig;
use mvc_dispatch::http::HttpServer;
use mvc_dispatch::lifecycle::{build_dispatcher, Shutdown};

/// A buffered response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[allow(dead_code)]
impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The fully layered router for `config`.
#[allow(dead_code)]
pub fn router_with(config: &AppConfig) -> Router {
    let dispatcher = build_dispatcher(config).unwrap();
    HttpServer::new(dispatcher, config).router()
}

#[allow(dead_code)]
pub fn router() -> Router {
    router_with(&AppConfig::default())
}

#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply { status, headers, body }
}

#[allow(dead_code)]
pub async fn get(router: &Router, path: &str) -> Reply {
    send(
        router,
        Request::builder().method(Method::GET).uri(path).body(Body::empty()).unwrap(),
    )
    .await
}

/// POST an url-encoded form.
#[allow(dead_code)]
pub async fn post_form(router: &Router, path: &str, form: &str) -> Reply {
    send(
        router,
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
}

/// A server running on an ephemeral port.
#[allow(dead_code)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Arc<Shutdown>,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
pub async fn start_server(config: AppConfig) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let dispatcher = build_dispatcher(&config).unwrap();
    let server = HttpServer::new(dispatcher, &config);
    let shutdown = Arc::new(Shutdown::new());
    let stopped = shutdown.wait();
    let handle = tokio::spawn(server.run(listener, stopped));

    RunningServer { addr, shutdown, handle }
}
