// Redis 缓存后端测试
// 本地随机端口上的最小 RESP 应答服务代替真实 Redis

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pnr_status::{
    cache::{CacheError, RedisCache, StatusCache, pnr_status_key},
    error::FetchError,
    provider::PnrProvider,
    routes::status::{Pnr, StatusFetcher},
};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, tcp::OwnedReadHalf};
use tokio::sync::Mutex;

const CACHE_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Clone, Default)]
struct FakeRedis {
    values: Arc<Mutex<HashMap<String, String>>>,
    ttls: Arc<Mutex<HashMap<String, u64>>>,
}

impl FakeRedis {
    async fn store(&self, key: &str, value: &str, ttl: Option<u64>) {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        if let Some(ttl) = ttl {
            self.ttls.lock().await.insert(key.to_string(), ttl);
        }
    }

    async fn value(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    async fn ttl(&self, key: &str) -> Option<u64> {
        self.ttls.lock().await.get(key).copied()
    }

    async fn reply(&self, args: &[String]) -> String {
        let name = args
            .first()
            .map(|s| s.to_ascii_uppercase())
            .unwrap_or_default();

        match (name.as_str(), args) {
            ("GET", [_, key]) => match self.value(key).await {
                Some(v) => format!("${}\r\n{}\r\n", v.len(), v),
                None => "$-1\r\n".to_string(),
            },
            ("SETEX", [_, key, secs, value]) => {
                self.store(key, value, secs.parse().ok()).await;
                "+OK\r\n".to_string()
            }
            ("SET", [_, key, value, rest @ ..]) => {
                let ttl = match rest {
                    [ex, secs] if ex.eq_ignore_ascii_case("EX") => secs.parse().ok(),
                    _ => None,
                };
                self.store(key, value, ttl).await;
                "+OK\r\n".to_string()
            }
            ("PING", _) => "+PONG\r\n".to_string(),
            _ => "+OK\r\n".to_string(),
        }
    }

    async fn serve(&self, stream: TcpStream) {
        let (read, mut write) = stream.into_split();
        let mut reader = BufReader::new(read);
        while let Some(args) = read_command(&mut reader).await {
            let reply = self.reply(&args).await;
            if write.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
    }
}

async fn read_command(reader: &mut BufReader<OwnedReadHalf>) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

async fn spawn_fake_redis() -> (String, FakeRedis) {
    let fake = FakeRedis::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = fake.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let server = server.clone();
            tokio::spawn(async move { server.serve(stream).await });
        }
    });

    (format!("redis://{}", addr), fake)
}

// 接受连接但从不应答
async fn spawn_silent_redis() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("redis://{}", addr)
}

fn redis_cache(url: &str) -> RedisCache {
    let client = redis::Client::open(url).unwrap();
    RedisCache::new(Arc::new(client), CACHE_TIMEOUT)
}

struct StaticProvider {
    body: String,
    calls: AtomicUsize,
}

impl StaticProvider {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PnrProvider for StaticProvider {
    async fn fetch_page(&self, _pnr: &Pnr) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

#[tokio::test]
async fn stores_json_under_pnr_key_with_ttl() {
    let (url, fake) = spawn_fake_redis().await;
    let cache = redis_cache(&url);
    let key = pnr_status_key("1234567890");
    let status = json!({"Pnr": "1234567890", "Passengers": [{"Status": "CNF"}]});

    cache
        .set(&key, &status, Duration::from_secs(300))
        .await
        .unwrap();

    let stored = fake.value("pnr_status_1234567890").await.unwrap();
    assert_eq!(serde_json::from_str::<Value>(&stored).unwrap(), status);
    assert_eq!(fake.ttl("pnr_status_1234567890").await, Some(300));

    assert_eq!(cache.get(&key).await.unwrap(), Some(status));
}

#[tokio::test]
async fn sub_second_ttl_is_raised_to_one_second() {
    let (url, fake) = spawn_fake_redis().await;
    let cache = redis_cache(&url);

    cache
        .set("pnr_status_0000000001", &json!({}), Duration::from_millis(200))
        .await
        .unwrap();
    assert_eq!(fake.ttl("pnr_status_0000000001").await, Some(1));
}

#[tokio::test]
async fn missing_key_is_a_miss() {
    let (url, _) = spawn_fake_redis().await;
    let cache = redis_cache(&url);

    assert_eq!(cache.get("pnr_status_9999999999").await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_cached_value_is_refetched_and_replaced() {
    let (url, fake) = spawn_fake_redis().await;
    fake.store("pnr_status_1234567890", "not json", None).await;
    let cache = Arc::new(redis_cache(&url));

    assert!(matches!(
        cache.get("pnr_status_1234567890").await,
        Err(CacheError::Serialization(_))
    ));

    let provider = StaticProvider::new(r#"<script>data = {"fresh":true};</script>"#);
    let fetcher = StatusFetcher::new(cache, provider.clone(), Duration::from_secs(300));

    let status = fetcher.get_status("1234567890").await.unwrap();
    assert_eq!(status, json!({"fresh": true}));
    assert_eq!(provider.calls(), 1);

    let stored = fake.value("pnr_status_1234567890").await.unwrap();
    assert_eq!(serde_json::from_str::<Value>(&stored).unwrap(), status);
}

#[tokio::test]
async fn unresponsive_redis_times_out() {
    let cache = redis_cache(&spawn_silent_redis().await);

    let result = tokio::time::timeout(Duration::from_secs(5), cache.get("pnr_status_1"))
        .await
        .expect("cache read should give up on its own");
    assert!(matches!(result, Err(CacheError::Timeout(_))));
}

#[tokio::test]
async fn unresponsive_redis_does_not_block_status() {
    let cache = Arc::new(redis_cache(&spawn_silent_redis().await));
    let provider = StaticProvider::new(r#"<script>data = {"foo":"bar"};</script>"#);
    let fetcher = StatusFetcher::new(cache, provider.clone(), Duration::from_secs(300));

    let status = tokio::time::timeout(Duration::from_secs(5), fetcher.get_status("1234567890"))
        .await
        .expect("status should not wait on the cache")
        .unwrap();
    assert_eq!(status, json!({"foo": "bar"}));
    assert_eq!(provider.calls(), 1);
}
