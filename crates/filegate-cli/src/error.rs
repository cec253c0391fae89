//! Error kinds and the error responder

use crate::envelope::Envelope;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use filegate_storage::{ResolveError, StorageError};
use thiserror::Error;

/// Message shown to clients in place of unexpected internal failures
pub const REDACTED_MESSAGE: &str = "Internal server error";

/// Message shown to clients when the backend failed without a usable message
pub const UNAVAILABLE_MESSAGE: &str = "Storage backend unavailable";

/// Stable external error vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingParameter,
    ProviderResolutionFailed,
    NotFound,
    Backend,
    Unexpected,
    AccessDenied,
    RouteNotFound,
}

impl ErrorKind {
    /// Get the error kind string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingParameter => "MissingParameter",
            Self::ProviderResolutionFailed => "ProviderResolutionFailed",
            Self::NotFound => "NotFound",
            Self::Backend => "Backend",
            Self::Unexpected => "Unexpected",
            Self::AccessDenied => "AccessDenied",
            Self::RouteNotFound => "RouteNotFound",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::MissingParameter
            | Self::ProviderResolutionFailed
            | Self::Backend
            | Self::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("The name parameter is required")]
    MissingParameter,

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Provider(#[from] ResolveError),

    #[error("The object does not exist")]
    NotFound,

    #[error("{0}")]
    Backend(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Unexpected(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("404 - Not Found")]
    RouteNotFound,
}

impl ApiError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter | Self::InvalidQuery(_) => ErrorKind::MissingParameter,
            Self::Provider(ResolveError::Construction { .. }) => ErrorKind::Backend,
            Self::Provider(_) => ErrorKind::ProviderResolutionFailed,
            Self::NotFound => ErrorKind::NotFound,
            Self::Backend(_) | Self::Unavailable(_) => ErrorKind::Backend,
            Self::Unexpected(_) => ErrorKind::Unexpected,
            Self::AccessDenied => ErrorKind::AccessDenied,
            Self::RouteNotFound => ErrorKind::RouteNotFound,
        }
    }

    /// Message safe to put in the response body
    pub fn client_message(&self) -> String {
        match self {
            Self::Unexpected(_) => REDACTED_MESSAGE.to_string(),
            Self::Unavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ObjectNotFound { .. } => Self::NotFound,
            StorageError::Backend(message) | StorageError::Configuration(message) => {
                Self::Backend(message)
            }
            StorageError::Unavailable(detail) => Self::Unavailable(detail),
            StorageError::Io(e) => Self::Unexpected(e.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

/// Attached to error responses so the reporting middleware can forward them
#[derive(Debug, Clone)]
pub struct ReportedError {
    pub kind: ErrorKind,
    /// Unredacted description
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let body: Envelope<()> = Envelope::error(self.client_message());

        let mut response = (kind.status_code(), Json(body)).into_response();
        response.extensions_mut().insert(ReportedError {
            kind,
            detail: self.to_string(),
        });
        response
    }
}
