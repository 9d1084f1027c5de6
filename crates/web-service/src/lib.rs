//! Web服务模块
//!
//! 提供 HTTP API 接口和文档服务

use crate::services::{BackendService, HttpUrlChecker, HubService, LocalStorageService};
use color_eyre::Result;
use database::{DatabasePool, PgRepository};
use shared_lib::AppConfig;
use std::sync::Arc;
use tokio::sync::watch::Receiver;
use tower_http::services::ServeDir;
use tracing::info;

pub mod models;
pub mod routes;
pub mod services;

/// 应用共享状态
pub struct AppState<S: BackendService> {
    pub service: Arc<S>,
}

// 手写 Clone，避免要求 S 本身实现 Clone
impl<S: BackendService> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// 启动 Web 服务
pub async fn start_web_service(
    config: Arc<AppConfig>,
    pool: DatabasePool,
    mut shutdown_rx: Receiver<bool>,
) -> Result<()> {
    let repository = PgRepository::new(pool);
    let storage = LocalStorageService::new(&config.storage);
    let service = HubService::new(
        repository,
        storage,
        HttpUrlChecker::new(),
        config.stat_card_template.clone(),
    );
    let shared_state = AppState {
        service: Arc::new(service),
    };

    // /img 路径直接回源本地缩略图目录
    let router = routes::create_app_router(shared_state)
        .nest_service("/img", ServeDir::new(&config.storage.upload_dir));

    info!("🚀 启动 Web Service 在 {}", config.server_addr);

    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_rx.changed().await.expect("Failed to receive shutdown signal");
            info!("🛑 Web Service 正在关闭...");
        })
        .await?;

    Ok(())
}
