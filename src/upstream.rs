use std::time::Duration;

use axum::body::Bytes;
use serde::de::IgnoredAny;
use url::Url;

use crate::error::ProxyError;
use crate::signing::{Credentials, Signature};
use crate::types::PageRequest;

/// Single best-effort call to the upstream character endpoint. No retry, no cache.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base: String,
}

impl UpstreamClient {
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProxyError::Transport)?;
        Ok(Self::with_client(http, base))
    }

    pub fn with_client(http: reqwest::Client, base: impl Into<String>) -> Self {
        Self { http, base: base.into() }
    }

    /// Build the signed `characters` URL for one request.
    pub fn characters_url(&self, req: &PageRequest, sig: &Signature) -> Result<Url, ProxyError> {
        let mut url = Url::parse(&format!("{}/characters", self.base.trim_end_matches('/')))?;
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("ts", &sig.ts)
                .append_pair("apikey", &sig.apikey)
                .append_pair("hash", &sig.hash)
                .append_pair("limit", &req.limit.to_string())
                .append_pair("offset", &req.offset.to_string());
            if let Some(term) = &req.search {
                q.append_pair("nameStartsWith", term);
            }
        }
        Ok(url)
    }

    /// Fetch one page and hand back the upstream body byte for byte, once it
    /// is known to be JSON.
    pub async fn fetch_characters(&self, req: &PageRequest, creds: &Credentials) -> Result<Bytes, ProxyError> {
        let sig = Signature::now(creds);
        let url = self.characters_url(req, &sig)?;
        tracing::debug!(limit = req.limit, offset = req.offset, search = ?req.search, "calling upstream");
        let resp = self.http.get(url).send().await.map_err(ProxyError::Transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus(status));
        }
        let body = resp.bytes().await.map_err(ProxyError::Body)?;
        serde_json::from_slice::<IgnoredAny>(&body).map_err(ProxyError::NotJson)?;
        Ok(body)
    }
}
