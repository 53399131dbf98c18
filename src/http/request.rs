//! Request identification and begin-request logging.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Log the start of every request with its ID before dispatch
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The same ID is echoed back on the response (`x-request-id`)

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by `SetRequestIdLayer`.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Logs every request as it enters the pipeline.
pub async fn begin_request(request: Request<Body>, next: Next) -> Response {
    tracing::info!(
        request_id = %request_id(&request),
        method = %request.method(),
        path = %request.uri().path(),
        "Begin request"
    );
    next.run(request).await
}
