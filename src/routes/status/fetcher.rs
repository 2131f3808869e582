use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{StatusCache, pnr_status_key};
use crate::error::FetchError;
use crate::provider::PnrProvider;

use super::model::{Pnr, extract_status};

/// 校验 PNR，先查缓存，未命中时抓取页面并写回缓存
#[derive(Clone)]
pub struct StatusFetcher {
    cache: Arc<dyn StatusCache>,
    provider: Arc<dyn PnrProvider>,
    ttl: Duration,
}

impl StatusFetcher {
    pub fn new(cache: Arc<dyn StatusCache>, provider: Arc<dyn PnrProvider>, ttl: Duration) -> Self {
        Self {
            cache,
            provider,
            ttl,
        }
    }

    pub async fn get_status(&self, pnr_query: &str) -> Result<Value, FetchError> {
        let pnr = Pnr::parse(pnr_query)?;
        let cache_key = pnr_status_key(pnr.as_str());

        // 缓存读取失败按未命中处理
        match self.cache.get(&cache_key).await {
            Ok(Some(status)) => {
                tracing::debug!("Get PNR status from cache: {}", cache_key);
                return Ok(status);
            }
            Ok(None) => tracing::debug!("PNR status cache miss: {}", cache_key),
            Err(e) => tracing::warn!("Failed to read PNR status cache {}: {}", cache_key, e),
        }

        let html = self.provider.fetch_page(&pnr).await?;
        let status = extract_status(&html).inspect_err(|e| match e {
            FetchError::NotFound => tracing::info!("No status data in page for PNR {}", pnr),
            other => tracing::error!("Failed to parse status for PNR {}: {}", pnr, other),
        })?;

        if let Err(e) = self.cache.set(&cache_key, &status, self.ttl).await {
            tracing::warn!("Failed to write PNR status cache {}: {}", cache_key, e);
        }

        Ok(status)
    }
}
