//! Error types for the filegate-storage crate

use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur while fetching objects from a provider
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend confirmed that the object does not exist
    #[error("object not found: {key}")]
    ObjectNotFound { key: String },

    /// Any other backend-reported failure (permissions, missing bucket)
    #[error("{0}")]
    Backend(String),

    /// The backend could not be reached or gave no usable error message;
    /// carries the transport-level detail
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// The provider was configured without the values it needs
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local file failure while writing a download
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a not-found error for a key
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::ObjectNotFound { key: key.into() }
    }

    /// Check whether this error means the object is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}
