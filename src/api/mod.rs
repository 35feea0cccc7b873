//! HTTP API served by the proxy.
//!
//! # Endpoints
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /api/expand` | [`handlers::expand`] |
//! | `GET /api/search` | [`handlers::search`] |
//! | `POST /api/download` | [`handlers::download`] |
//! | `GET /health` | [`handlers::health`] |
//!
//! Every failure is answered with `{"error": "..."}` (see [`ApiError`]).

pub mod error;
pub mod handlers;

pub use error::{ApiError, ErrorBody};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::llm::{GeminiClient, TextGenerator};
use crate::sources::{ArxivSource, Source};
use crate::utils::HttpClient;

/// Response header listing identifiers dropped from a batch download
pub static SKIPPED_PAPERS_HEADER: HeaderName = HeaderName::from_static("x-skipped-papers");

/// Shared application state for the server.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct AppState {
    /// Paper search and PDF provider
    pub source: Arc<dyn Source>,
    /// LLM backend; `None` when no credential is configured
    pub generator: Option<Arc<dyn TextGenerator>>,
}

impl AppState {
    /// Assemble state from explicit collaborators
    pub fn new(source: Arc<dyn Source>, generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { source, generator }
    }

    /// Build the production collaborators described by `config`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = HttpClient::from_config(&config.http)?;
        let source: Arc<dyn Source> = Arc::new(ArxivSource::new(client.clone(), &config.arxiv));

        let generator: Option<Arc<dyn TextGenerator>> =
            match GeminiClient::from_config(client, &config.gemini) {
                Ok(gemini) => {
                    tracing::info!(model = gemini.model(), "Gemini keyword expansion enabled");
                    Some(Arc::new(gemini))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Keyword expansion disabled");
                    None
                }
            };

        Ok(Self::new(source, generator))
    }

    /// Whether keyword expansion can reach an LLM
    pub fn gemini_configured(&self) -> bool {
        self.generator.is_some()
    }
}

/// Build the router with all endpoints, CORS and request tracing
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/expand", post(handlers::expand))
        .route("/api/search", get(handlers::search))
        .route("/api/download", post(handlers::download))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin may call the API; download metadata headers are readable by browsers
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION, SKIPPED_PAPERS_HEADER.clone()])
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, version = crate::VERSION, "arxiv-explorer listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("ctrl-c received; shutting down");
        })
        .await
}
