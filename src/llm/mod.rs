//! Text-generation backends used for keyword expansion.
//!
//! The expansion logic only needs "prompt in, free text out", expressed by the
//! [`TextGenerator`] trait. [`GeminiClient`] is the production backend.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key. Set GEMINI_API_KEY to enable keyword expansion.")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

/// A service that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Generate text for `prompt` at the given sampling temperature
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError>;
}
