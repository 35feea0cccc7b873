//! Search request and response models.

use serde::{Deserialize, Serialize};

use super::Paper;

/// Result count used when the caller does not specify one
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string
    pub query: String,

    /// Maximum number of results to return
    pub max_results: usize,
}

impl SearchQuery {
    /// Create a new search query with the default result count
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// Body returned by `/api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Papers in feed order
    pub papers: Vec<Paper>,

    /// Number of papers returned
    pub total: usize,
}

impl SearchResponse {
    /// Create a response; `total` always matches `papers.len()`
    pub fn new(papers: Vec<Paper>) -> Self {
        let total = papers.len();
        Self { papers, total }
    }
}
