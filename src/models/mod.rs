//! Core data models for papers, subtopics and the HTTP payloads that carry them.

mod download;
mod paper;
mod search;
mod subtopic;

pub use download::DownloadRequest;
pub use paper::{Paper, PaperBuilder, NOT_AVAILABLE};
pub use search::{SearchQuery, SearchResponse, DEFAULT_MAX_RESULTS};
pub use subtopic::{ExpandRequest, ExpandResponse, Subtopic};
