//! Per-request spans.

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::X_REQUEST_ID;

/// Span for `TraceLayer`, tagged with the request ID set by the
/// request-id layer.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
