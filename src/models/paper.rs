//! Paper model representing one normalized arXiv search result.

use serde::{Deserialize, Serialize};

/// Placeholder for fields missing from the upstream feed
pub const NOT_AVAILABLE: &str = "N/A";

/// A paper returned by `/api/search`
///
/// Text fields never carry nulls: anything the feed omits is rendered as
/// [`NOT_AVAILABLE`]. Only `id` and `pdf_url` may be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv identifier (the part of the entry id after `/abs/`)
    pub id: Option<String>,

    /// Paper title
    pub title: String,

    /// Authors (comma-separated)
    pub authors: String,

    /// Abstract text
    pub summary: String,

    /// Publication date (`YYYY-MM-DD`)
    pub published: String,

    /// Direct PDF URL
    pub pdf_url: Option<String>,
}

/// Builder for constructing Paper objects from partially known fields
#[derive(Debug, Clone, Default)]
pub struct PaperBuilder {
    id: Option<String>,
    title: Option<String>,
    authors: Vec<String>,
    summary: Option<String>,
    published: Option<String>,
    pdf_url: Option<String>,
}

impl PaperBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifier
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add one author
    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.authors.push(name.into());
        self
    }

    /// Set abstract
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set publication date; only the leading `YYYY-MM-DD` is kept
    pub fn published(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.published = Some(date.chars().take(10).collect());
        self
    }

    /// Set PDF URL
    pub fn pdf_url(mut self, url: impl Into<String>) -> Self {
        self.pdf_url = Some(url.into());
        self
    }

    /// Build the Paper, substituting [`NOT_AVAILABLE`] for missing text
    pub fn build(self) -> Paper {
        let text = |value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        let authors = if self.authors.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.authors.join(", ")
        };

        Paper {
            id: self.id,
            title: text(self.title),
            authors,
            summary: text(self.summary),
            published: text(self.published),
            pdf_url: self.pdf_url,
        }
    }
}
