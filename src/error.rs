//! Error types for the proxy, the page client and configuration loading.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors raised while serving a proxy request.
///
/// Every variant collapses into an HTTP 500 with a generic JSON body; the
/// detail only goes to the log.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("API keys not configured")]
    MissingCredentials,
    #[error("invalid upstream url: {0}")]
    InvalidUpstreamUrl(#[from] url::ParseError),
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned {0}")]
    UpstreamStatus(reqwest::StatusCode),
    #[error("reading upstream body failed: {0}")]
    Body(#[source] reqwest::Error),
    #[error("upstream body was not JSON: {0}")]
    NotJson(#[source] serde_json::Error),
}

impl ProxyError {
    /// Message shown to callers of the proxy.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MissingCredentials => "API keys not configured",
            _ => "Failed to fetch characters",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "proxy request failed");
        let body = serde_json::json!({ "error": self.public_message() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Errors raised while fetching a page from the proxy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid proxy url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request to proxy failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("proxy returned {status}: {message}")]
    Status { status: reqwest::StatusCode, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
