//! Gateway configuration

use filegate_storage::{S3Config, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Header carrying the shared secret when none is configured
pub const DEFAULT_ACCESS_KEY_HEADER: &str = "ACCESS_KEY";

/// Provider registered and used by versioned requests out of the box
pub const DEFAULT_PROVIDER: &str = "bucketeer";

/// Gateway server configuration, resolved once at startup
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Expected shared secret; `None` rejects every request
    #[serde(skip_serializing)]
    pub access_key: Option<String>,
    /// Request header compared against the shared secret
    pub access_key_header: String,
    /// Error-monitoring endpoint; `None` disables monitoring
    pub monitor_dsn: Option<String>,
    /// Directory for per-request temporary downloads
    pub temp_dir: PathBuf,
    /// Storage providers available to requests
    pub providers: Vec<ProviderConfig>,
    /// Provider used by versioned requests without an explicit or mapped provider
    pub default_provider: Option<String>,
    /// API version to provider mapping
    pub api_versions: BTreeMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            access_key: None,
            access_key_header: DEFAULT_ACCESS_KEY_HEADER.to_string(),
            monitor_dsn: None,
            temp_dir: PathBuf::from("tmp"),
            providers: Vec::new(),
            default_provider: Some(DEFAULT_PROVIDER.to_string()),
            api_versions: BTreeMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("access_key_header", &self.access_key_header)
            .field("monitor_dsn", &self.monitor_dsn)
            .field("temp_dir", &self.temp_dir)
            .field("providers", &self.providers)
            .field("default_provider", &self.default_provider)
            .field("api_versions", &self.api_versions)
            .finish()
    }
}

/// Credentials and target of one named storage provider
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider identifier used in requests (e.g. `bucketeer`)
    pub name: String,
    /// Access key id
    pub access_key_id: Option<String>,
    /// Secret access key
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    /// Bucket name
    pub bucket: Option<String>,
    /// Region (defaults to `us-east-1`)
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services
    pub endpoint_url: Option<String>,
}

impl ProviderConfig {
    /// Read `<NAME>_AWS_*` variables for a provider from the environment
    pub fn from_env(name: &str) -> Self {
        let prefix = env_prefix(name);
        let var = |suffix: &str| {
            std::env::var(format!("{prefix}_AWS_{suffix}"))
                .ok()
                .filter(|value| !value.is_empty())
        };

        Self {
            name: name.to_string(),
            access_key_id: var("ACCESS_KEY_ID"),
            secret_access_key: var("SECRET_ACCESS_KEY"),
            bucket: var("BUCKET_NAME"),
            region: var("REGION"),
            endpoint_url: var("ENDPOINT_URL"),
        }
    }

    /// Build the S3 client configuration, failing if the credential triple is incomplete
    pub fn s3_config(&self) -> Result<S3Config, StorageError> {
        let prefix = env_prefix(&self.name);
        let require = |value: &Option<String>, suffix: &str| {
            value.clone().ok_or_else(|| {
                StorageError::Configuration(format!(
                    "provider '{}' is missing {prefix}_AWS_{suffix}",
                    self.name
                ))
            })
        };

        let mut config = S3Config::new(
            require(&self.access_key_id, "ACCESS_KEY_ID")?,
            require(&self.secret_access_key, "SECRET_ACCESS_KEY")?,
            require(&self.bucket, "BUCKET_NAME")?,
        );
        if let Some(region) = &self.region {
            config = config.with_region(region);
        }
        if let Some(endpoint) = &self.endpoint_url {
            config = config.with_endpoint(endpoint);
        }
        Ok(config)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<redacted>"))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Environment variable prefix for a provider name
fn env_prefix(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

/// Parse a `version=provider` pair
pub fn parse_version_mapping(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((version, provider)) if !version.trim().is_empty() && !provider.trim().is_empty() => {
            Ok((version.trim().to_string(), provider.trim().to_string()))
        }
        _ => Err(format!("expected VERSION=PROVIDER, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.access_key_header, "ACCESS_KEY");
        assert!(config.access_key.is_none());
        assert!(config.monitor_dsn.is_none());
        assert_eq!(config.default_provider.as_deref(), Some("bucketeer"));
    }

    #[test]
    fn test_from_env() {
        // Unique provider name so parallel tests never share variables
        std::env::set_var("CONFIG_TEST_STORE_AWS_ACCESS_KEY_ID", "12345");
        std::env::set_var("CONFIG_TEST_STORE_AWS_SECRET_ACCESS_KEY", "shhhhh!");
        std::env::set_var("CONFIG_TEST_STORE_AWS_BUCKET_NAME", "its-a-secret");
        std::env::set_var("CONFIG_TEST_STORE_AWS_REGION", "");

        let provider = ProviderConfig::from_env("config-test-store");
        assert_eq!(provider.name, "config-test-store");
        assert_eq!(provider.access_key_id.as_deref(), Some("12345"));
        assert_eq!(provider.bucket.as_deref(), Some("its-a-secret"));
        assert!(provider.region.is_none());

        let s3 = provider.s3_config().unwrap();
        assert_eq!(s3.bucket, "its-a-secret");
        assert_eq!(s3.region, "us-east-1");
    }

    #[test]
    fn test_incomplete_provider() {
        let provider = ProviderConfig {
            name: "bucketeer".to_string(),
            access_key_id: Some("12345".to_string()),
            secret_access_key: Some("shhhhh!".to_string()),
            ..Default::default()
        };

        let err = provider.s3_config().unwrap_err();
        assert!(err.to_string().contains("BUCKETEER_AWS_BUCKET_NAME"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = GatewayConfig {
            access_key: Some("1234567".to_string()),
            providers: vec![ProviderConfig {
                name: "bucketeer".to_string(),
                secret_access_key: Some("shhhhh!".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("1234567"));
        assert!(!debug.contains("shhhhh!"));
    }

    #[rstest]
    #[case("v1=bucketeer", Some(("v1", "bucketeer")))]
    #[case(" v2 = archive ", Some(("v2", "archive")))]
    #[case("v1", None)]
    #[case("=bucketeer", None)]
    #[case("v1=", None)]
    fn test_parse_version_mapping(#[case] input: &str, #[case] expected: Option<(&str, &str)>) {
        let parsed = parse_version_mapping(input).ok();
        let expected = expected.map(|(v, p)| (v.to_string(), p.to_string()));
        assert_eq!(parsed, expected);
    }
}
