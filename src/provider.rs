// 访问第三方 PNR 状态网站

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::FetchError;
use crate::routes::status::Pnr;

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// 返回 PNR 状态页面的原始 HTML
#[async_trait]
pub trait PnrProvider: Send + Sync {
    async fn fetch_page(&self, pnr: &Pnr) -> Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProvider {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        Self::with_builder(reqwest::Client::builder(), base_url, timeout, user_agent)
    }

    /// 在给定的 builder 上追加浏览器请求头与超时
    pub fn with_builder(
        builder: reqwest::ClientBuilder,
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = builder
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn status_url(&self, pnr: &Pnr) -> String {
        format!("{}/pnr-status/{}", self.base_url, pnr)
    }
}

#[async_trait]
impl PnrProvider for HttpProvider {
    async fn fetch_page(&self, pnr: &Pnr) -> Result<String, FetchError> {
        let url = self.status_url(pnr);
        tracing::debug!("Fetching PNR page: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Failed to reach PNR service: {}", e);
            FetchError::UpstreamUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("PNR service returned {} for {}", status, url);
            return Err(FetchError::UpstreamError(status));
        }

        response.text().await.map_err(|e| {
            tracing::error!("Failed to read PNR page body: {}", e);
            if e.is_timeout() {
                FetchError::UpstreamUnavailable(e.to_string())
            } else {
                FetchError::InternalError(e.to_string())
            }
        })
    }
}
