//! Shared-secret access gate

use crate::{ApiError, AppState, GatewayConfig};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, Request, header::InvalidHeaderName},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Reject,
}

/// Compares a request header against the configured shared secret.
///
/// Fails closed: without a configured secret every request is rejected.
#[derive(Clone)]
pub struct AccessGate {
    header: HeaderName,
    expected: Option<String>,
}

impl AccessGate {
    /// Create a gate for a header name and expected secret
    pub fn new(header: &str, expected: Option<String>) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            header: HeaderName::from_bytes(header.as_bytes())?,
            expected: expected.filter(|secret| !secret.is_empty()),
        })
    }

    /// Create a gate from the gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self, InvalidHeaderName> {
        Self::new(&config.access_key_header, config.access_key.clone())
    }

    /// Header the gate inspects
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Check request headers
    pub fn check(&self, headers: &HeaderMap) -> GateDecision {
        let Some(expected) = self.expected.as_deref() else {
            return GateDecision::Reject;
        };

        match headers.get(&self.header) {
            Some(provided) if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) => {
                GateDecision::Allow
            }
            _ => GateDecision::Reject,
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("header", &self.header)
            .field("configured", &self.expected.is_some())
            .finish()
    }
}

/// Access gate middleware, applied to every route including the fallback
pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match state.gate.check(request.headers()) {
        GateDecision::Allow => Ok(next.run(request).await),
        GateDecision::Reject => {
            tracing::debug!(
                uri = %request.uri(),
                header = %state.gate.header(),
                "Request rejected by access gate"
            );
            Err(ApiError::AccessDenied)
        }
    }
}
