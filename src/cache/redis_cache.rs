use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, aio::ConnectionManager};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::{CacheError, StatusCache};

#[derive(Clone)]
pub struct RedisCache {
    redis: Arc<RedisClient>,
    // 首次使用时建立，之后复用，断线由 ConnectionManager 自动重连
    conn: Arc<OnceCell<ConnectionManager>>,
    timeout: Duration,
}

impl RedisCache {
    pub fn new(redis: Arc<RedisClient>, timeout: Duration) -> Self {
        Self {
            redis,
            conn: Arc::new(OnceCell::new()),
            timeout,
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| ConnectionManager::new((*self.redis).clone()))
            .await?;
        Ok(conn.clone())
    }

    // 连接与命令整体限时，Redis 无响应时按缓存错误处理
    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl StatusCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let cached: Option<String> = conn.get(key).await?;

            match cached {
                Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let json_str = serde_json::to_string(value)?;
        self.bounded(async {
            let mut conn = self.connection().await?;
            // EX 不接受 0 秒
            let _: () = conn.set_ex(key, json_str, ttl.as_secs().max(1)).await?;
            tracing::debug!("Set PNR status to cache: {}", key);
            Ok(())
        })
        .await
    }
}
