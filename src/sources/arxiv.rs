//! arXiv research source implementation.

use async_trait::async_trait;

use crate::config::ArxivConfig;
use crate::models::{Paper, SearchQuery};
use crate::sources::{feed, Source, SourceError};
use crate::utils::HttpClient;

/// arXiv research source
///
/// Supports:
/// - Search by query (Atom API, relevance order)
/// - Fetch PDFs by identifier
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    api_url: String,
    pdf_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source against the configured endpoints
    pub fn new(client: HttpClient, config: &ArxivConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            pdf_url: config.pdf_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the query URL for a search
    ///
    /// The search always covers all fields, starts at the first result and is
    /// sorted by descending relevance.
    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}&sortBy=relevance&sortOrder=descending",
            self.api_url,
            urlencoding::encode(&format!("all:{}", query.query)),
            query.max_results,
        )
    }

    /// URL of the PDF for a paper identifier
    pub fn pdf_url(&self, paper_id: &str) -> String {
        format!("{}/{}.pdf", self.pdf_url, paper_id)
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn name(&self) -> &str {
        "arXiv"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Paper>, SourceError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "Querying arXiv");

        let response = self
            .client
            .client()
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Ok(feed::parse_feed(&bytes))
    }

    async fn fetch_pdf(&self, paper_id: &str) -> Result<Vec<u8>, SourceError> {
        self.validate_id(paper_id)?;

        let url = self.pdf_url(paper_id);
        tracing::debug!(%url, "Fetching PDF");

        let response = self
            .client
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(paper_id.to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "PDF host returned status {} for {}",
                status, paper_id
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read PDF {}: {}", paper_id, e)))?;

        Ok(bytes.to_vec())
    }

    /// Identifiers become part of the PDF URL path and of response headers,
    /// so anything that could escape either is rejected.
    fn validate_id(&self, id: &str) -> Result<(), SourceError> {
        if id.is_empty() {
            return Err(SourceError::InvalidRequest("Empty arXiv ID".to_string()));
        }
        if id.contains("..") || id.chars().any(|c| c.is_whitespace() || matches!(c, '?' | '#' | '\\' | '"' | ',')) {
            return Err(SourceError::InvalidRequest(format!("Malformed arXiv ID: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(api_url: &str, pdf_url: &str) -> ArxivSource {
        let config = ArxivConfig {
            api_url: api_url.to_string(),
            pdf_url: pdf_url.to_string(),
        };
        ArxivSource::new(HttpClient::new().unwrap(), &config)
    }

    const ONE_ENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2301.12345v1</id>
    <title>Test Paper Title</title>
    <summary>Test abstract</summary>
    <published>2023-01-15T10:00:00Z</published>
    <author><name>Test Author</name></author>
    <link title="pdf" href="http://arxiv.org/pdf/2301.12345v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

    #[test]
    fn test_search_url() {
        let src = source("http://export.arxiv.org/api/query", "https://arxiv.org/pdf");
        let url = src.search_url(&SearchQuery::new("transformer attention").max_results(5));

        assert!(url.starts_with("http://export.arxiv.org/api/query?"));
        assert!(url.contains("search_query=all%3Atransformer%20attention"));
        assert!(url.contains("start=0"));
        assert!(url.contains("max_results=5"));
        assert!(url.contains("sortBy=relevance"));
        assert!(url.contains("sortOrder=descending"));
    }

    #[test]
    fn test_pdf_url() {
        let src = source("http://export.arxiv.org/api/query", "https://arxiv.org/pdf/");
        assert_eq!(src.pdf_url("2301.12345"), "https://arxiv.org/pdf/2301.12345.pdf");
        assert_eq!(
            src.pdf_url("math.GT/0104020"),
            "https://arxiv.org/pdf/math.GT/0104020.pdf"
        );
    }

    #[test]
    fn test_validate_id() {
        let src = source("http://localhost", "http://localhost");
        assert!(src.validate_id("2301.12345v2").is_ok());
        assert!(src.validate_id("math.GT/0104020").is_ok());
        assert!(src.validate_id("").is_err());
        assert!(src.validate_id("../etc/passwd").is_err());
        assert!(src.validate_id("2301.12345?x=1").is_err());
        assert!(src.validate_id("2301 12345").is_err());
        assert!(src.validate_id("2301.12345\"").is_err());
        assert!(src.validate_id("2301.1,2301.2").is_err());
    }

    #[tokio::test]
    async fn test_search_with_mock_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("search_query".into(), "all:attention".into()),
                mockito::Matcher::UrlEncoded("max_results".into(), "3".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/atom+xml")
            .with_body(ONE_ENTRY)
            .create_async()
            .await;

        let src = source(&format!("{}/api/query", server.url()), &server.url());
        let papers = src
            .search(&SearchQuery::new("attention").max_results(3))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].id.as_deref(), Some("2301.12345v1"));
        assert_eq!(papers[0].title, "Test Paper Title");
    }

    #[tokio::test]
    async fn test_search_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let src = source(&format!("{}/api/query", server.url()), &server.url());
        let result = src.search(&SearchQuery::new("attention")).await;
        assert!(matches!(result, Err(SourceError::Api(_))));
    }

    #[tokio::test]
    async fn test_fetch_pdf() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/pdf/2301.12345.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(b"%PDF-1.4 test")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/pdf/9999.99999.pdf")
            .with_status(404)
            .create_async()
            .await;

        let src = source("http://unused", &format!("{}/pdf", server.url()));

        let bytes = src.fetch_pdf("2301.12345").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 test");

        let missing = src.fetch_pdf("9999.99999").await;
        assert!(matches!(missing, Err(SourceError::NotFound(_))));
    }
}
