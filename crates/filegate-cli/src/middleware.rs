//! HTTP middleware for request ids, logging and error reporting

use crate::AppState;
use crate::error::ReportedError;
use crate::monitor::MonitorEvent;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Request ID middleware - adds an `x-request-id` header
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

/// Error reporting middleware - logs error responses and forwards them to the monitor
pub async fn report_errors(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());

    let mut response = next.run(request).await;

    if let Some(reported) = response.extensions_mut().remove::<ReportedError>() {
        let server_error = response.status().is_server_error();
        if server_error {
            tracing::error!(
                kind = reported.kind.as_str(),
                error = %reported.detail,
                %method,
                %path,
                "Request failed"
            );
        } else {
            tracing::warn!(
                kind = reported.kind.as_str(),
                error = %reported.detail,
                %method,
                %path,
                "Request failed"
            );
        }

        state.monitor.capture(MonitorEvent {
            level: if server_error { "error" } else { "warning" },
            kind: reported.kind.as_str(),
            message: reported.detail,
            method,
            path,
            request_id,
            timestamp: chrono::Utc::now(),
        });
    }

    response
}
