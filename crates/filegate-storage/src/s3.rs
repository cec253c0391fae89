//! S3 storage client built on `aws-sdk-s3`

use crate::{Result, StorageClient, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use bytes::Bytes;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// Default region used when a provider does not configure one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Credentials and target of one S3 provider
#[derive(Clone, Debug)]
pub struct S3Config {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket the client is bound to
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint for S3-compatible services (enables path-style addressing)
    pub endpoint_url: Option<String>,
}

impl S3Config {
    /// Create a config for the default region
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket: bucket.into(),
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
        }
    }

    /// Set the region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set a custom endpoint
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// S3-backed storage client bound to one bucket
#[derive(Clone, Debug)]
pub struct S3StorageClient {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3StorageClient {
    /// Build a client from static credentials. No network I/O happens here.
    pub fn new(config: S3Config) -> Result<Self> {
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(StorageError::Configuration(
                "S3 credentials are not configured".to_string(),
            ));
        }
        if config.bucket.is_empty() {
            return Err(StorageError::Configuration(
                "S3 bucket name is not configured".to_string(),
            ));
        }

        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "filegate",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);

        if let Some(endpoint) = config.endpoint_url {
            // S3-compatible services rarely support virtual-hosted buckets
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket,
        })
    }

    async fn get_object(&self, key: &str) -> Result<GetObjectOutput> {
        self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| classify_get_error(key, err.into_service_error()))
    }
}

#[async_trait]
impl StorageClient for S3StorageClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[instrument(level = "debug", skip(self), fields(bucket = %self.bucket))]
    async fn download(&self, key: &str) -> Result<Bytes> {
        let output = self.get_object(key).await?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(data.into_bytes())
    }

    #[instrument(level = "debug", skip(self, dest), fields(bucket = %self.bucket))]
    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64> {
        let mut output = self.get_object(key).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = output
            .body
            .try_next()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(bytes = written, "Object downloaded");
        Ok(written)
    }
}

/// Map an S3 `GetObject` failure onto the storage error vocabulary
fn classify_get_error(key: &str, err: GetObjectError) -> StorageError {
    if err.is_no_such_key() || matches!(err.code(), Some("NoSuchKey") | Some("NotFound")) {
        return StorageError::not_found(key);
    }

    let detail = DisplayErrorContext(&err).to_string();
    warn!(key = %key, code = ?err.code(), error = %detail, "S3 GetObject failed");
    match err.message() {
        Some(message) => StorageError::Backend(message.to_owned()),
        None => StorageError::Unavailable(detail),
    }
}
