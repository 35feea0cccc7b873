//! JSON error envelope returned by every endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::download::DownloadError;
use crate::expand::ExpandError;
use crate::llm::LlmError;
use crate::sources::SourceError;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors surfaced at the HTTP boundary.
///
/// Messages are safe to show to users. Causes of upstream, format and
/// internal failures are logged where the error is converted, never returned.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or empty required input
    #[error("{0}")]
    Validation(String),

    /// A search, PDF or LLM upstream failed
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// The LLM credential is not configured
    #[error("{0}")]
    Configuration(String),

    /// The LLM reply could not be parsed
    #[error("{0}")]
    Format(String),

    /// Failure inside this service
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamUnavailable(_)
            | ApiError::Configuration(_)
            | ApiError::Format(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ExpandError> for ApiError {
    fn from(err: ExpandError) -> Self {
        match err {
            ExpandError::EmptyQuery => ApiError::Validation("Please enter a search query.".to_string()),
            ExpandError::Llm(LlmError::MissingApiKey) => {
                ApiError::Configuration("Gemini API key is not configured.".to_string())
            }
            ExpandError::Llm(e) => {
                tracing::error!(error = %e, "Keyword expansion LLM call failed");
                ApiError::UpstreamUnavailable("Keyword expansion service is unavailable.".to_string())
            }
            ExpandError::Format { raw, source } => {
                tracing::error!(error = %source, raw = %raw, "LLM reply is not valid JSON");
                ApiError::Format("Failed to parse the keyword expansion response.".to_string())
            }
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        tracing::error!(error = %err, "arXiv search failed");
        ApiError::UpstreamUnavailable("arXiv API request failed.".to_string())
    }
}

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::NoPaperIds => {
                ApiError::Validation("Please select papers to download.".to_string())
            }
            DownloadError::BlankPaperId => {
                ApiError::Validation("Paper IDs must not be blank.".to_string())
            }
            DownloadError::MalformedPaperId(id) => {
                ApiError::Validation(format!("Malformed paper ID: {}", id))
            }
            DownloadError::Fetch { .. } | DownloadError::NothingDownloaded { .. } => {
                tracing::error!(error = %err, "PDF download failed");
                ApiError::UpstreamUnavailable("PDF download failed.".to_string())
            }
            DownloadError::Archive(_) | DownloadError::Io(_) => {
                tracing::error!(error = %err, "Failed to build PDF archive");
                ApiError::Internal("Failed to build the download archive.".to_string())
            }
        }
    }
}
