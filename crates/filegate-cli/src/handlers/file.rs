//! File retrieval handler

use crate::staging::TempDownload;
use crate::{ApiError, AppState, sniff};
use axum::{
    body::Body,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Query parameters of the file endpoints
#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    pub name: Option<String>,
    pub provider: Option<String>,
}

/// A validated retrieval request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub object_key: String,
    pub provider: Option<String>,
    pub api_version: Option<String>,
}

impl RetrievalRequest {
    /// Validate query parameters; the object key is mandatory and non-empty.
    ///
    /// A present but empty `provider` is kept so resolution reports it as invalid.
    pub fn from_query(query: FileQuery, api_version: Option<String>) -> Result<Self, ApiError> {
        let object_key = query
            .name
            .filter(|name| !name.is_empty())
            .ok_or(ApiError::MissingParameter)?;

        Ok(Self {
            object_key,
            provider: query.provider,
            api_version,
        })
    }
}

/// GET /file?name=<key>&provider=<id>
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let request = RetrievalRequest::from_query(query, None)?;
    retrieve_file(&state, request).await
}

/// GET /{version}/file?name=<key>[&provider=<id>]
pub async fn get_versioned_file(
    State(state): State<Arc<AppState>>,
    Path(version): Path<String>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let request = RetrievalRequest::from_query(query, Some(version))?;
    retrieve_file(&state, request).await
}

/// Resolve the provider, download into a temp file, sniff and respond.
///
/// The temp file is removed before returning on every path: explicitly on
/// success, by `Drop` when any step fails.
pub async fn retrieve_file(
    state: &AppState,
    request: RetrievalRequest,
) -> Result<Response, ApiError> {
    let client = state
        .registry
        .resolve(request.provider.as_deref(), request.api_version.as_deref())?;

    let temp = TempDownload::create(&state.config.temp_dir, &request.object_key)?;
    debug!(
        key = %request.object_key,
        bucket = %client.bucket(),
        temp = %temp.path().display(),
        "Downloading object"
    );

    client.download_to(&request.object_key, temp.path()).await?;

    let data = tokio::fs::read(temp.path()).await?;
    let content_type = sniff::detect(&data);
    let size = data.len();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .body(Body::from(data))
        .map_err(|e| ApiError::Unexpected(e.to_string()))?;

    temp.cleanup()?;

    info!(
        key = %request.object_key,
        content_type = %content_type,
        size,
        "File served"
    );
    Ok(response)
}
