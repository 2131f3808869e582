use std::sync::Arc;

use axum::{Router, routing::get};
use config::Config;
use routes::status::StatusFetcher;

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod provider;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub fetcher: Arc<StatusFetcher>,
}

/// 组装路由与中间件
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/status/", get(routes::status::get_status))
        .route("/status", get(routes::status::get_status))
        .layer(axum::middleware::from_fn(middleware::log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
