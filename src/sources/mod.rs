//! Paper sources behind the search and download endpoints.
//!
//! This module defines the [`Source`] trait the HTTP layer talks to. The
//! production implementation is [`ArxivSource`]; [`MockSource`] serves canned
//! papers and PDFs for tests.
//!
//! - [`feed`]: Atom feed normalization into [`Paper`] records
//! - [`ArxivSource`]: arXiv query API and PDF host client

mod arxiv;
pub mod feed;
pub mod mock;

pub use arxiv::ArxivSource;
pub use mock::MockSource;

use crate::models::{Paper, SearchQuery};
use async_trait::async_trait;

/// The Source trait defines the interface for paper providers.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source, for logs
    fn name(&self) -> &str;

    /// Search for papers matching the query, in relevance order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError>;

    /// Fetch the PDF bytes for a paper identifier
    async fn fetch_pdf(&self, paper_id: &str) -> Result<Vec<u8>, SourceError>;

    /// Validate that a paper ID is correctly formatted for this source
    fn validate_id(&self, _id: &str) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("API error: {0}")]
    Api(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Paper not found
    #[error("Paper not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}
