//! # arXiv Explorer
//!
//! An HTTP proxy that sits between a browser front-end and two upstream
//! services: Google's Gemini text-generation API and arXiv.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`api`]: HTTP router, handlers and the JSON error envelope
//! - [`expand`]: Research question to three keyword subtopics via an LLM
//! - [`download`]: Single PDF or zip archive of several papers
//! - [`sources`]: arXiv search and PDF retrieval behind the [`Source`] trait
//! - [`llm`]: Text-generation backends behind the [`TextGenerator`](llm::TextGenerator) trait
//! - [`models`]: Request and response data structures
//! - [`utils`]: Shared HTTP client
//! - [`config`]: Configuration management

pub mod api;
pub mod config;
pub mod download;
pub mod expand;
pub mod llm;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use api::{build_router, AppState};
pub use config::Config;
pub use models::{Paper, Subtopic};
pub use sources::Source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
