//! Keyword expansion: turn a free-form research question into three arXiv
//! search keywords with short descriptions.
//!
//! The model is asked for a JSON object; its reply goes through
//! [`extract_json`] (markdown fence stripping, then JSON parsing) and
//! [`subtopics_from_json`], which always produces exactly three entries by
//! filling gaps with positional fallback text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::llm::{LlmError, TextGenerator};
use crate::models::Subtopic;

/// Number of subtopics returned per expansion
pub const SUBTOPIC_COUNT: usize = 3;

/// Sampling temperature; favors diverse keywords over determinism
pub const KEYWORD_TEMPERATURE: f32 = 0.7;

/// First fenced block: optional language tag, body up to the closing fence
/// (or end of text when the fence is never closed)
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*[A-Za-z0-9_+.\-]*[ \t]*\r?\n?(.*?)(?:```|\z)")
        .expect("fence pattern is valid")
});

/// Errors raised by keyword expansion
#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    /// The query was empty after trimming
    #[error("Query must not be empty")]
    EmptyQuery,

    /// The LLM call failed, or no LLM is configured
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The reply was not valid JSON after fence stripping
    #[error("LLM reply is not valid JSON: {source}")]
    Format {
        /// Text that failed to parse
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Build the expansion prompt for a user query
pub fn build_prompt(query: &str) -> String {
    format!(
        r#"You are an expert in AI research papers. Based on the user's input, expand it into search keywords for arXiv.

For example, if the user writes "VLMs combine vision and language, how does that work?", suggest a concrete search keyword such as "VLM linear projection".

Input topic: "{query}"

Each keyword must be an English keyword optimized for arXiv search.
Describe what each keyword covers in 3-4 short English sentences.
Suggest exactly 3 keywords.

Respond with JSON only, in exactly this format (no other text):
{{
    "keywords": {{
        "keyword1": "search keyword 1",
        "description1": "description of keyword 1",
        "keyword2": "search keyword 2",
        "description2": "description of keyword 2",
        "keyword3": "search keyword 3",
        "description3": "description of keyword 3"
    }}
}}
"#
    )
}

/// Return the text that should be parsed as JSON: the body of the first
/// fenced code block when one exists, otherwise the whole reply. Trimmed.
pub fn strip_fence(text: &str) -> &str {
    match FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text.trim(),
    }
}

/// Parse an LLM reply as JSON, tolerating markdown code fences
pub fn extract_json(text: &str) -> Result<Value, ExpandError> {
    let candidate = strip_fence(text);
    serde_json::from_str(candidate).map_err(|source| ExpandError::Format {
        raw: candidate.to_string(),
        source,
    })
}

/// Map parsed model output to exactly [`SUBTOPIC_COUNT`] subtopics.
///
/// Accepts `{"keywords": {"keyword1": .., "description1": .., ...}}` and the
/// array form `{"keywords": [{"keyword": .., "description": ..}, ...]}`.
/// Anything missing, blank or not a string is replaced with fallback text
/// derived from `query` and the 1-based position.
pub fn subtopics_from_json(query: &str, parsed: &Value) -> Vec<Subtopic> {
    let keywords = parsed.get("keywords");

    (1..=SUBTOPIC_COUNT)
        .map(|position| {
            let (title, description) = match keywords {
                Some(Value::Object(map)) => (
                    non_blank(map.get(&format!("keyword{}", position))),
                    non_blank(map.get(&format!("description{}", position))),
                ),
                Some(Value::Array(items)) => {
                    let item = items.get(position - 1);
                    (
                        non_blank(item.and_then(|i| i.get("keyword"))),
                        non_blank(item.and_then(|i| i.get("description"))),
                    )
                }
                _ => (None, None),
            };

            let fallback = Subtopic::fallback(query, position);
            Subtopic {
                title: title.unwrap_or(fallback.title),
                description: description.unwrap_or(fallback.description),
            }
        })
        .collect()
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Expand a research question into three subtopics.
///
/// `generator` is `None` when no LLM credential is configured; that is
/// reported as [`LlmError::MissingApiKey`] after input validation.
pub async fn expand_query(
    generator: Option<&dyn TextGenerator>,
    query: &str,
) -> Result<Vec<Subtopic>, ExpandError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ExpandError::EmptyQuery);
    }

    let generator = generator.ok_or(LlmError::MissingApiKey)?;

    let reply = generator
        .generate(&build_prompt(query), KEYWORD_TEMPERATURE)
        .await?;
    tracing::debug!(backend = generator.name(), reply = %reply, "LLM reply");

    let parsed = extract_json(&reply)?;
    let subtopics = subtopics_from_json(query, &parsed);
    tracing::debug!(?subtopics, "Expanded query");

    Ok(subtopics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const FULL: &str = r#"{"keywords": {
        "keyword1": "VLM linear projection",
        "description1": "Projection layers between encoders.",
        "keyword2": "cross-attention fusion",
        "description2": "Fusing modalities with cross-attention.",
        "keyword3": "contrastive pretraining",
        "description3": "CLIP-style objectives."
    }}"#;

    #[derive(Debug)]
    struct StubGenerator {
        reply: String,
        prompts: Mutex<Vec<(String, f32)>>,
    }

    impl StubGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_strip_fence_variants_agree() {
        let tagged = format!("```json\n{}\n```", FULL);
        let plain = format!("```\n{}\n```", FULL);
        let surrounded = format!("Here you go:\n```json\n{}\n```\nAnything else?", FULL);

        let expected = extract_json(FULL).unwrap();
        assert_eq!(extract_json(&tagged).unwrap(), expected);
        assert_eq!(extract_json(&plain).unwrap(), expected);
        assert_eq!(extract_json(&surrounded).unwrap(), expected);
    }

    #[test]
    fn test_strip_fence_edge_cases() {
        assert_eq!(strip_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_fence("```JSON\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fence("```{\"a\": 1}```"), "{\"a\": 1}");
        // Unterminated fence runs to end of text
        assert_eq!(strip_fence("```json\n{\"a\": 1}\n"), "{\"a\": 1}");
        // Only the first block is used
        assert_eq!(strip_fence("```\n{\"a\": 1}\n```\n```\n{\"b\": 2}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_reports_raw_text() {
        let err = extract_json("```json\nnot json\n```").unwrap_err();
        match err {
            ExpandError::Format { raw, .. } => assert_eq!(raw, "not json"),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_subtopics_full_object() {
        let parsed = extract_json(FULL).unwrap();
        let subtopics = subtopics_from_json("vlm", &parsed);

        assert_eq!(subtopics.len(), SUBTOPIC_COUNT);
        assert_eq!(subtopics[0].title, "VLM linear projection");
        assert_eq!(subtopics[2].description, "CLIP-style objectives.");
    }

    #[test]
    fn test_subtopics_missing_third() {
        let parsed = serde_json::json!({"keywords": {
            "keyword1": "qubit error correction",
            "description1": "Correcting errors.",
            "keyword2": "quantum annealing",
            "description2": "Optimization."
        }});
        let subtopics = subtopics_from_json("quantum computing", &parsed);

        assert_eq!(
            subtopics[2],
            Subtopic {
                title: "quantum computing aspect 3".to_string(),
                description: "Research related to quantum computing".to_string(),
            }
        );
        assert_eq!(subtopics[1].title, "quantum annealing");
    }

    #[test]
    fn test_subtopics_array_form() {
        let parsed = serde_json::json!({"keywords": [
            {"keyword": "diffusion models", "description": "Score-based generation."},
            {"keyword": "", "description": "Blank keyword."}
        ]});
        let subtopics = subtopics_from_json("generative", &parsed);

        assert_eq!(subtopics[0].title, "diffusion models");
        assert_eq!(subtopics[1].title, "generative aspect 2");
        assert_eq!(subtopics[1].description, "Blank keyword.");
        assert_eq!(subtopics[2], Subtopic::fallback("generative", 3));
    }

    #[test]
    fn test_subtopics_unexpected_shapes() {
        for parsed in [
            serde_json::json!({}),
            serde_json::json!([1, 2, 3]),
            serde_json::json!({"keywords": "nope"}),
            serde_json::json!({"keywords": {"keyword1": 42, "description1": null}}),
        ] {
            let subtopics = subtopics_from_json("q", &parsed);
            assert_eq!(subtopics.len(), SUBTOPIC_COUNT);
            for (i, s) in subtopics.iter().enumerate() {
                assert_eq!(*s, Subtopic::fallback("q", i + 1));
            }
        }
    }

    #[test]
    fn test_build_prompt_mentions_query() {
        let prompt = build_prompt("graph neural networks");
        assert!(prompt.contains("\"graph neural networks\""));
        assert!(prompt.contains("\"keyword3\""));
        assert!(prompt.contains("\"description3\""));
        assert!(prompt.contains("exactly 3"));
    }

    #[tokio::test]
    async fn test_expand_query_trims_and_uses_temperature() {
        let stub = StubGenerator::new(&format!("```json\n{}\n```", FULL));
        let subtopics = expand_query(Some(&stub), "  vision language  ").await.unwrap();

        assert_eq!(subtopics.len(), 3);
        let prompts = stub.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].0.contains("\"vision language\""));
        assert_eq!(prompts[0].1, KEYWORD_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_expand_query_rejects_blank_before_llm() {
        let stub = StubGenerator::new(FULL);
        let result = expand_query(Some(&stub), "   ").await;

        assert!(matches!(result, Err(ExpandError::EmptyQuery)));
        assert!(stub.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expand_query_without_generator() {
        let result = expand_query(None, "quantum").await;
        assert!(matches!(result, Err(ExpandError::Llm(LlmError::MissingApiKey))));
    }

    #[tokio::test]
    async fn test_expand_query_invalid_json() {
        let stub = StubGenerator::new("I cannot help with that.");
        let result = expand_query(Some(&stub), "quantum").await;
        assert!(matches!(result, Err(ExpandError::Format { .. })));
    }
}
