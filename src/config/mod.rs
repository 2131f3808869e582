use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PROVIDER_URL: &str = "https://www.confirmtkt.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    // 未配置时使用进程内缓存
    pub redis_url: Option<String>,
    pub cache_timeout_ms: u64,
    pub provider_url: String,
    pub upstream_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            redis_url: None,
            cache_timeout_ms: 500,
            provider_url: DEFAULT_PROVIDER_URL.into(),
            upstream_timeout_secs: 10,
            cache_ttl_secs: 300,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            cache_timeout_ms: parse_var("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms)?,
            provider_url: env::var("PNR_PROVIDER_URL").unwrap_or(defaults.provider_url),
            upstream_timeout_secs: parse_var(
                "UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout_secs,
            )?,
            cache_ttl_secs: parse_var("PNR_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            user_agent: env::var("UPSTREAM_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}
