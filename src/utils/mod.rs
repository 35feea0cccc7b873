//! Utility modules supporting the proxy.
//!
//! - [`HttpClient`]: shared outbound HTTP client built from [`HttpConfig`](crate::config::HttpConfig)

mod http;

pub use http::HttpClient;
