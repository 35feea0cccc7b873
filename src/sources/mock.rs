//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{Paper, PaperBuilder, SearchQuery};
use crate::sources::{Source, SourceError};

/// A mock source for testing that returns predefined responses.
#[derive(Debug, Default)]
pub struct MockSource {
    papers: Mutex<Vec<Paper>>,
    pdfs: Mutex<HashMap<String, Vec<u8>>>,
    search_error: Mutex<Option<String>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the papers every search returns (truncated to `max_results`).
    pub fn set_papers(&self, papers: Vec<Paper>) {
        let mut guard = self.papers.lock().unwrap();
        *guard = papers;
    }

    /// Make searches fail with an upstream error.
    pub fn fail_search(&self, message: impl Into<String>) {
        let mut guard = self.search_error.lock().unwrap();
        *guard = Some(message.into());
    }

    /// Register PDF bytes for an identifier; other identifiers are not found.
    pub fn add_pdf(&self, paper_id: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let mut guard = self.pdfs.lock().unwrap();
        guard.insert(paper_id.into(), bytes.into());
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        self.queries.lock().unwrap().push(query.clone());

        if let Some(message) = self.search_error.lock().unwrap().clone() {
            return Err(SourceError::Api(message));
        }

        let guard = self.papers.lock().unwrap();
        Ok(guard.iter().take(query.max_results).cloned().collect())
    }

    async fn fetch_pdf(&self, paper_id: &str) -> Result<Vec<u8>, SourceError> {
        let guard = self.pdfs.lock().unwrap();
        guard
            .get(paper_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(paper_id.to_string()))
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(paper_id: &str, title: &str) -> Paper {
    PaperBuilder::new()
        .id(paper_id)
        .title(title)
        .author("Test Author")
        .summary("Test abstract")
        .published("2024-01-01T00:00:00Z")
        .pdf_url(format!("http://arxiv.org/pdf/{}", paper_id))
        .build()
}
