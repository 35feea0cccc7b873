//! Keyword expansion models.

use serde::{Deserialize, Serialize};

/// One LLM-proposed search keyword with its explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    /// Search keyword, used as the arXiv query
    pub title: String,

    /// Short English description of what the keyword covers
    pub description: String,
}

impl Subtopic {
    /// Positional fallback used when the model omits an entry (`position` is 1-based)
    pub fn fallback(query: &str, position: usize) -> Self {
        Self {
            title: fallback_title(query, position),
            description: fallback_description(query),
        }
    }
}

pub(crate) fn fallback_title(query: &str, position: usize) -> String {
    format!("{} aspect {}", query, position)
}

pub(crate) fn fallback_description(query: &str) -> String {
    format!("Research related to {}", query)
}

/// Body accepted by `/api/expand`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpandRequest {
    /// Free-form research question
    #[serde(default)]
    pub query: String,
}

/// Body returned by `/api/expand`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandResponse {
    /// Always exactly three entries
    pub subtopics: Vec<Subtopic>,
}
