//! # Filegate Storage
//!
//! Object storage providers for the filegate gateway.
//!
//! This crate provides:
//! - **StorageClient**: the download capability every backend implements
//! - **S3**: an `aws-sdk-s3` client bound to one bucket and credential set
//! - **Memory**: an in-memory backend for tests and embedding
//! - **ProviderRegistry**: name to client-factory lookup, with API-version defaults
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             File handler                │
//! ├─────────────────────────────────────────┤
//! │           ProviderRegistry              │
//! ├─────────────────────────────────────────┤
//! │          StorageClient Trait            │
//! ├────────────────────┬────────────────────┤
//! │  S3StorageClient   │MemoryStorageClient │
//! ├────────────────────┴────────────────────┤
//! │        S3 / S3-compatible service       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use filegate_storage::{ProviderRegistry, S3Config, S3StorageClient};
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register("bucketeer", move || {
//!     Ok(Box::new(S3StorageClient::new(config.clone())?))
//! });
//! let client = registry.resolve(Some("bucketeer"), None)?;
//! let bytes = client.download("dirname/ninja.png").await?;
//! ```

pub mod error;
pub mod memory;
pub mod registry;
pub mod s3;

pub use error::{Result, StorageError};
pub use memory::MemoryStorageClient;
pub use registry::{ClientFactory, ProviderRegistry, ResolveError};
pub use s3::{S3Config, S3StorageClient};

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Download capability shared by every storage backend.
///
/// Implementations are bound to a single bucket at construction and must
/// normalize backend failures into [`StorageError::ObjectNotFound`],
/// [`StorageError::Backend`] or [`StorageError::Unavailable`].
#[async_trait]
pub trait StorageClient: fmt::Debug + Send + Sync {
    /// Bucket or container this client reads from
    fn bucket(&self) -> &str;

    /// Fetch the full contents of an object
    async fn download(&self, key: &str) -> Result<Bytes>;

    /// Fetch an object into a local file, returning the number of bytes written
    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64> {
        let data = self.download(key).await?;
        let mut file = tokio::fs::File::create(dest).await?;
        file.write_all(&data).await?;
        file.flush().await?;
        Ok(data.len() as u64)
    }
}
