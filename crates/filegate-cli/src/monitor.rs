//! Error-monitoring collaborator
//!
//! Every error response is forwarded here. Delivery is fire-and-forget: a
//! failing monitor is logged and never changes the response a client sees.

use crate::GatewayConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// One reported failure
#[derive(Debug, Clone, Serialize)]
pub struct MonitorEvent {
    /// `error` for server-side failures, `warning` for client-side ones
    pub level: &'static str,
    /// Error kind (e.g. `Backend`)
    pub kind: &'static str,
    /// Unredacted description
    pub message: String,
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Sink for error events
pub trait ErrorMonitor: Send + Sync {
    /// Report an event without waiting for delivery
    fn capture(&self, event: MonitorEvent);

    /// Whether events go anywhere
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Monitor used when no DSN is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMonitor;

impl ErrorMonitor for DisabledMonitor {
    fn capture(&self, event: MonitorEvent) {
        debug!(kind = event.kind, "Error monitoring disabled, event dropped");
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Posts events as JSON to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpMonitor {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpMonitor {
    /// Create a monitor for an endpoint
    pub fn new(endpoint: Url) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Endpoint events are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ErrorMonitor for HttpMonitor {
    fn capture(&self, event: MonitorEvent) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            match client.post(endpoint).json(&event).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(kind = event.kind, "Error event delivered");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "Error monitor rejected event");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to deliver error event");
                }
            }
        });
    }
}

/// Build the monitor selected by the configuration
pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Arc<dyn ErrorMonitor>> {
    match config.monitor_dsn.as_deref().filter(|dsn| !dsn.is_empty()) {
        Some(dsn) => {
            let endpoint = Url::parse(dsn)
                .map_err(|e| anyhow::anyhow!("invalid monitor DSN '{dsn}': {e}"))?;
            Ok(Arc::new(HttpMonitor::new(endpoint)?))
        }
        None => Ok(Arc::new(DisabledMonitor)),
    }
}
