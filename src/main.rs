use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use pnr_status::{
    AppState, app,
    cache::{MemoryCache, RedisCache, StatusCache},
    config::Config,
    provider::HttpProvider,
    routes::status::StatusFetcher,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置缓存，未配置 Redis 时退回进程内缓存
    let cache: Arc<dyn StatusCache> = match &config.redis_url {
        Some(url) => {
            let redis_client =
                redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            tracing::info!(
                "Caching PNR status in Redis with {:?} timeout",
                config.cache_timeout()
            );
            Arc::new(RedisCache::new(
                Arc::new(redis_client),
                config.cache_timeout(),
            ))
        }
        None => {
            tracing::info!("REDIS_URL not set, caching PNR status in memory");
            Arc::new(MemoryCache::new())
        }
    };

    // 设置上游客户端
    let provider = HttpProvider::new(
        &config.provider_url,
        config.upstream_timeout(),
        &config.user_agent,
    )
    .expect("Failed to build HTTP client");
    tracing::info!(
        "Using PNR provider {} with {:?} timeout",
        config.provider_url,
        config.upstream_timeout()
    );

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        fetcher: Arc::new(StatusFetcher::new(
            cache,
            Arc::new(provider),
            config.cache_ttl(),
        )),
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app(state),
    )
    .await
    .expect("Failed to start server");
}
