// 缓存模块
// 状态缓存接口与 Redis / 内存两种实现

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod keys;
mod memory;
mod redis_cache;

pub use keys::pnr_status_key;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cached value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// 带过期时间的键值存储，缓存内容不具权威性，未命中时总是可以重新抓取
#[async_trait]
pub trait StatusCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;
}
