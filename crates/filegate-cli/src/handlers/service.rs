//! Service-level handlers (welcome, default route sink)

use crate::ApiError;
use crate::envelope::Envelope;
use axum::Json;
use serde::Serialize;

/// Payload of the welcome endpoint
#[derive(Debug, Serialize)]
pub struct WelcomeMessage {
    pub message: &'static str,
}

/// GET /welcome
pub async fn welcome() -> Json<Envelope<WelcomeMessage>> {
    Json(Envelope::success(WelcomeMessage { message: "Welcome" }))
}

/// Any unmatched route
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
