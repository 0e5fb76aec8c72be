//! Signed request proxy.
//!
//! `GET /api/characters?limit&offset&search` signs the call with a fresh
//! timestamp and hash, forwards it upstream and relays the JSON body as-is.
//! Any failure becomes a 500 with a generic `{"error": ...}` body.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::config::CameoConfig;
use crate::error::ProxyError;
use crate::signing::CredentialSource;
use crate::types::{PageRequest, DEFAULT_PAGE_SIZE};
use crate::upstream::UpstreamClient;

pub const CHARACTERS_PATH: &str = "/api/characters";

#[derive(Clone)]
pub struct ProxyState {
    upstream: UpstreamClient,
    credentials: Arc<dyn CredentialSource>,
}

impl ProxyState {
    pub fn new(upstream: UpstreamClient, credentials: Arc<dyn CredentialSource>) -> Self {
        Self { upstream, credentials }
    }
}

/// Raw query parameters. Kept as strings so a malformed number falls back
/// to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct CharactersQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub search: Option<String>,
}

impl CharactersQuery {
    pub fn into_page_request(self) -> PageRequest {
        let num = |v: Option<String>, default: u32| v.and_then(|s| s.trim().parse().ok()).unwrap_or(default);
        let limit = num(self.limit, DEFAULT_PAGE_SIZE);
        let offset = num(self.offset, 0);
        PageRequest::new(limit, offset, self.search.as_deref())
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(CHARACTERS_PATH, get(characters))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn characters(
    State(state): State<ProxyState>,
    Query(query): Query<CharactersQuery>,
) -> Result<impl IntoResponse, ProxyError> {
    // Looked up per request, never cached.
    let creds = state.credentials.credentials()?;
    let req = query.into_page_request();
    let body = state.upstream.fetch_characters(&req, &creds).await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(cfg: &CameoConfig, credentials: Arc<dyn CredentialSource>) -> Result<()> {
    let upstream = UpstreamClient::new(cfg.upstream_url.clone(), cfg.upstream_timeout)
        .context("building upstream http client")?;
    let app = router(ProxyState::new(upstream, credentials));
    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    let local: SocketAddr = listener.local_addr()?;
    tracing::info!(addr = %local, upstream = %cfg.upstream_url, "proxy listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("serving proxy")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{Credentials, StaticCredentials};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn keys() -> Arc<dyn CredentialSource> {
        Arc::new(StaticCredentials(Some(Credentials { public_key: "pub".into(), private_key: "priv".into() })))
    }

    fn app(upstream: &str, creds: Arc<dyn CredentialSource>) -> Router {
        app_with_timeout(upstream, creds, Duration::from_secs(5))
    }

    fn app_with_timeout(upstream: &str, creds: Arc<dyn CredentialSource>, timeout: Duration) -> Router {
        let client = UpstreamClient::new(upstream, timeout).unwrap();
        router(ProxyState::new(client, creds))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn query_defaults_and_fallbacks() {
        let req = CharactersQuery::default().into_page_request();
        assert_eq!(req, PageRequest::new(20, 0, None));
        let req = CharactersQuery { limit: Some("abc".into()), offset: Some("40".into()), search: Some("".into()) }
            .into_page_request();
        assert_eq!(req, PageRequest::new(20, 40, None));
    }

    #[tokio::test]
    async fn forwards_paging_and_search_then_relays_body() {
        let server = MockServer::start().await;
        let body = json!({ "data": { "results": [{ "id": 1, "name": "Spider-Man" }] } });
        Mock::given(method("GET"))
            .and(path("/characters"))
            .and(query_param("limit", "10"))
            .and(query_param("offset", "30"))
            .and(query_param("nameStartsWith", "spi"))
            .and(query_param("apikey", "pub"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let (status, got) = get_json(app(&server.uri(), keys()), "/api/characters?limit=10&offset=30&search=spi").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(got, body);
    }

    #[tokio::test]
    async fn defaults_apply_without_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "0"))
            .and(query_param_is_missing("nameStartsWith"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "results": [] } })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, _) = get_json(app(&server.uri(), keys()), "/api/characters").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_keys_is_a_500_without_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (status, got) = get_json(app(&server.uri(), Arc::new(StaticCredentials(None))), "/api/characters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(got, json!({ "error": "API keys not configured" }));
    }

    #[tokio::test]
    async fn upstream_failure_is_a_generic_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "code": "InvalidCredentials" })))
            .mount(&server)
            .await;

        let (status, got) = get_json(app(&server.uri(), keys()), "/api/characters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(got, json!({ "error": "Failed to fetch characters" }));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_generic_500() {
        // Nothing listens on port 9 of the loopback.
        let (status, got) = get_json(app("http://127.0.0.1:9", keys()), "/api/characters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(got, json!({ "error": "Failed to fetch characters" }));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_generic_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": { "results": [] } }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let app = app_with_timeout(&server.uri(), keys(), Duration::from_millis(100));
        let (status, got) = get_json(app, "/api/characters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(got, json!({ "error": "Failed to fetch characters" }));
    }

    #[tokio::test]
    async fn non_json_upstream_body_is_a_generic_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let (status, got) = get_json(app(&server.uri(), keys()), "/api/characters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(got, json!({ "error": "Failed to fetch characters" }));
    }

    #[tokio::test]
    async fn relayed_body_keeps_upstream_bytes_and_json_type() {
        let server = MockServer::start().await;
        let raw = r#"{"code":200,"attributionText":"Data provided by upstream","data":{"total":0,"results":[]}}"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(raw, "application/json"))
            .mount(&server)
            .await;

        let resp = app(&server.uri(), keys())
            .oneshot(Request::get("/api/characters").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], raw.as_bytes());
    }

    #[tokio::test]
    async fn search_term_is_forwarded_as_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("nameStartsWith", "Iron "))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "results": [] } })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, _) = get_json(app(&server.uri(), keys()), "/api/characters?search=Iron%20").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn health_check_answers() {
        let resp = app("http://127.0.0.1:9", keys())
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
