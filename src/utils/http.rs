//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;

/// Default user agent sent to upstream services
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client used for arXiv, PDF and LLM calls
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a new HTTP client from configuration
    ///
    /// No request timeout is set unless `timeout_secs` is configured.
    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: Arc::new(builder.build()?),
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
