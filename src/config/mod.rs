//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `ARXIV_EXPLORER__`. The result is an
//! immutable [`Config`] that `main` builds once and hands to the router.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:5000"
//!
//! [gemini]
//! api_key = "your-api-key"
//! model = "gemini-2.5-pro"
//!
//! [arxiv]
//! api_url = "http://export.arxiv.org/api/query"
//! pdf_url = "https://arxiv.org/pdf"
//!
//! [http]
//! timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Gemini API credential
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Prefix for environment overrides (`ARXIV_EXPLORER__SERVER__BIND=...`)
const ENV_PREFIX: &str = "ARXIV_EXPLORER";

/// Config file name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "arxiv-explorer.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM service settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// arXiv endpoints
    #[serde(default)]
    pub arxiv: ArxivConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Whether an LLM credential is available
    pub fn gemini_configured(&self) -> bool {
        self.gemini.api_key.is_some()
    }

    /// A copy safe to print: the API key is replaced by a marker
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gemini.api_key.is_some() {
            copy.gemini.api_key = Some("<redacted>".to_string());
        }
        copy
    }

    /// Drop credentials that are present but blank
    fn normalize(mut self) -> Self {
        self.gemini.api_key = non_blank(self.gemini.api_key);
        self
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

/// Gemini text-generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; falls back to `GEMINI_API_KEY`
    #[serde(default = "default_gemini_api_key")]
    pub api_key: Option<String>,

    /// Model name used for generation
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Base URL of the generative language API
    #[serde(default = "default_gemini_api_url")]
    pub api_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: default_gemini_api_key(),
            model: default_gemini_model(),
            api_url: default_gemini_api_url(),
        }
    }
}

fn default_gemini_api_key() -> Option<String> {
    non_blank(std::env::var(GEMINI_API_KEY_ENV).ok())
}

fn default_gemini_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// arXiv endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    /// Atom query API
    #[serde(default = "default_arxiv_api_url")]
    pub api_url: String,

    /// PDF host; papers are fetched from `{pdf_url}/{id}.pdf`
    #[serde(default = "default_arxiv_pdf_url")]
    pub pdf_url: String,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            api_url: default_arxiv_api_url(),
            pdf_url: default_arxiv_pdf_url(),
        }
    }
}

fn default_arxiv_api_url() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_arxiv_pdf_url() -> String {
    "https://arxiv.org/pdf".to_string()
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Whole-request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load configuration from a file, with environment overrides on top
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize::<Config>().map(Config::normalize)
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder().add_source(env_source()).build()?;

    settings.try_deserialize::<Config>().map(Config::normalize)
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

/// Find a config file in the default locations
///
/// Checks `./arxiv-explorer.toml`, then `<config dir>/arxiv-explorer/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("arxiv-explorer").join("config.toml"))
        .filter(|path| path.is_file())
}
