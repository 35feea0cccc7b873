//! HTTP route handlers.
//!
//! Handlers are kept thin: they validate transport-level input and delegate to
//! [`expand`](crate::expand), [`Source`](crate::sources::Source) and
//! [`download`](crate::download).

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::{AppState, SKIPPED_PAPERS_HEADER};
use crate::download::{download_papers, DownloadPayload};
use crate::expand::expand_query;
use crate::models::{
    DownloadRequest, ExpandRequest, ExpandResponse, SearchQuery, SearchResponse,
    DEFAULT_MAX_RESULTS,
};

/// Query string accepted by `/api/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,

    /// Kept as text so a malformed value gets a validation error
    #[serde(default)]
    pub max_results: Option<String>,
}

impl SearchParams {
    fn max_results(&self) -> Result<usize, ApiError> {
        match self.max_results.as_deref().map(str::trim) {
            None => Ok(DEFAULT_MAX_RESULTS),
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::Validation("max_results must be a non-negative integer.".to_string())
            }),
        }
    }
}

/// Body returned by `/health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub gemini_configured: bool,
}

/// GET `/health` - Liveness plus whether keyword expansion is available.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        gemini_configured: state.gemini_configured(),
    })
}

/// POST `/api/expand` - Expand a research question into three subtopics.
///
/// Request: `{"query": "..."}`. Response: `{"subtopics": [{"title", "description"} x3]}`.
pub async fn expand(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExpandRequest>, JsonRejection>,
) -> Result<Json<ExpandResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let subtopics = expand_query(state.generator.as_deref(), &request.query).await?;
    Ok(Json(ExpandResponse { subtopics }))
}

/// GET `/api/search` - Search arXiv.
///
/// Query parameters:
/// - `query`: Search query string (required)
/// - `max_results`: Maximum results (default: 10)
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;

    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::Validation("Please enter a search query.".to_string()));
    }
    let search_query = SearchQuery::new(query).max_results(params.max_results()?);

    tracing::info!(
        source = state.source.name(),
        query = %search_query.query,
        max_results = search_query.max_results,
        "Searching"
    );
    let papers = state.source.search(&search_query).await?;

    Ok(Json(SearchResponse::new(papers)))
}

/// POST `/api/download` - Download one PDF, or a zip of several.
///
/// Request: `{"paper_ids": ["2301.12345", ...]}`. Batch responses list
/// identifiers that could not be fetched in the `X-Skipped-Papers` header.
pub async fn download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;

    tracing::info!(count = request.paper_ids.len(), "Downloading papers");
    let payload = download_papers(state.source.as_ref(), &request.paper_ids).await?;

    Ok(attachment(payload))
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

/// Render a download payload as a binary attachment
fn attachment(payload: DownloadPayload) -> Response {
    let content_type = payload.content_type();
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        payload.filename()
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let (bytes, skipped) = match payload {
        DownloadPayload::Pdf { bytes, .. } => (bytes, Vec::new()),
        DownloadPayload::Archive { bytes, skipped, .. } => (bytes, skipped),
    };

    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    if !skipped.is_empty() {
        match HeaderValue::from_str(&skipped.join(",")) {
            Ok(value) => {
                headers.insert(&SKIPPED_PAPERS_HEADER, value);
            }
            Err(_) => tracing::warn!(?skipped, "Skipped paper IDs are not a valid header value"),
        }
    }

    response
}
