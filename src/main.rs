use color_eyre::Result;
use shared_lib::AppConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // 加载配置（.env + 环境变量）
    let config = AppConfig::load()?;

    // 创建数据库连接池并执行迁移
    let pool = database::initialize_database(config.clone()).await?;

    // 广播关闭信号：收到 Ctrl+C 后通知Web服务优雅退出
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("监听 Ctrl+C 信号失败: {err}");
        }
        info!("📢 收到退出信号，准备关闭服务...");
        let _ = shutdown_tx.send(true);
    });

    web_service::start_web_service(config, pool, shutdown_rx).await?;

    info!("✅ 服务已退出");

    Ok(())
}
