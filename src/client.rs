use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;
use crate::proxy::CHARACTERS_PATH;
use crate::types::{Envelope, Page, PageRequest};

/// Anything that can produce one page of catalog items.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, FetchError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, FetchError> {
        (**self).fetch_page(req).await
    }
}

/// Talks to the signed proxy over HTTP.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl ProxyClient {
    pub fn new(proxy_url: &str) -> Result<Self, FetchError> {
        Self::with_client(reqwest::Client::new(), proxy_url)
    }

    pub fn with_client(http: reqwest::Client, proxy_url: &str) -> Result<Self, FetchError> {
        let endpoint = Url::parse(proxy_url)?.join(CHARACTERS_PATH)?;
        Ok(Self { http, endpoint })
    }

    pub fn page_url(&self, req: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("limit", &req.limit.to_string())
                .append_pair("offset", &req.offset.to_string());
            if let Some(term) = &req.search {
                q.append_pair("search", term);
            }
        }
        url
    }
}

#[async_trait]
impl PageSource for ProxyClient {
    async fn fetch_page(&self, req: &PageRequest) -> Result<Page, FetchError> {
        let resp = self.http.get(self.page_url(req)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(FetchError::Status { status, message });
        }
        let env: Envelope = resp.json().await?;
        Ok(env.into())
    }
}
