//! Application state

use crate::config::GatewayConfig;
use crate::gate::AccessGate;
use crate::monitor::{self, ErrorMonitor};
use filegate_storage::{ProviderRegistry, S3StorageClient};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers, read-only after startup
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Provider registry
    pub registry: ProviderRegistry,
    /// Shared-secret access gate
    pub gate: AccessGate,
    /// Error monitor
    pub monitor: Arc<dyn ErrorMonitor>,
}

impl AppState {
    /// Create state with S3 providers built from the configuration
    pub async fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let registry = build_registry(&config);
        Self::with_registry(config, registry).await
    }

    /// Create state around an already populated registry
    pub async fn with_registry(
        config: GatewayConfig,
        registry: ProviderRegistry,
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.temp_dir).await?;

        let gate = AccessGate::from_config(&config)?;
        if config.access_key.is_none() {
            warn!("No access key configured - every request will be rejected");
        }

        let monitor = monitor::from_config(&config)?;
        if monitor.is_enabled() {
            info!("Error monitoring enabled");
        } else {
            info!("Error monitoring disabled (no DSN configured)");
        }

        info!(providers = ?registry.providers(), "Storage providers registered");

        Ok(Self {
            config,
            registry,
            gate,
            monitor,
        })
    }

    /// Replace the error monitor
    pub fn with_monitor(mut self, monitor: Arc<dyn ErrorMonitor>) -> Self {
        self.monitor = monitor;
        self
    }
}

/// Register one S3 client factory per configured provider.
///
/// Factories capture the provider's credentials; each call builds a fresh
/// client, so nothing is shared between requests.
pub fn build_registry(config: &GatewayConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    for provider in &config.providers {
        let provider = provider.clone();
        registry.register(provider.name.clone(), move || {
            let client = S3StorageClient::new(provider.s3_config()?)?;
            Ok(Box::new(client))
        });
    }

    for (version, provider) in &config.api_versions {
        registry.map_version(version, provider);
    }

    if let Some(default) = &config.default_provider {
        if !registry.contains(default) {
            warn!(provider = %default, "Default provider is not registered");
        }
        registry.set_default_provider(default);
    }

    registry
}
