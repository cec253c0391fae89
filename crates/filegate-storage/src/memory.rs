//! In-memory storage client for testing and embedding

use crate::{Result, StorageClient, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;

/// A storage client over a shared in-memory object map.
///
/// Clones share the same objects, so a registry factory can hand out a fresh
/// client per request while tests seed data through another handle.
#[derive(Clone, Debug)]
pub struct MemoryStorageClient {
    bucket: String,
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryStorageClient {
    /// Create an empty client bound to a bucket name
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Store an object
    pub fn put_object(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects.insert(key.into(), data.into());
    }

    /// Remove an object, returning whether it existed
    pub fn remove_object(&self, key: &str) -> bool {
        self.objects.remove(key).is_some()
    }

    /// Get the number of objects stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn download(&self, key: &str) -> Result<Bytes> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_existing_object() {
        let client = MemoryStorageClient::new("test-bucket");
        client.put_object("dirname/a.txt", "hello");

        let data = client.download("dirname/a.txt").await.unwrap();
        assert_eq!(&data[..], b"hello");
        assert_eq!(client.bucket(), "test-bucket");
    }

    #[tokio::test]
    async fn test_download_missing_object() {
        let client = MemoryStorageClient::new("test-bucket");

        let err = client.download("missing.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let client = MemoryStorageClient::new("test-bucket");
        let other = client.clone();
        other.put_object("k", "v");

        assert_eq!(client.len(), 1);
        assert!(client.remove_object("k"));
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_download_to_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let client = MemoryStorageClient::new("test-bucket");
        client.put_object("blob", vec![1u8, 2, 3, 4]);

        let written = client.download_to("blob", &dest).await.unwrap();
        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&dest).unwrap(), vec![1u8, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_download_to_missing_object_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let client = MemoryStorageClient::new("test-bucket");

        assert!(client.download_to("nope", &dest).await.is_err());
        assert!(!dest.exists());
    }
}
