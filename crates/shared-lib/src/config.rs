use color_eyre::eyre::Context;
use color_eyre::{Help, Result};
use std::sync::Arc;

/// 缩略图存储配置
pub struct StorageConfig {
    /// 缩略图落盘目录
    ///
    /// 可通过环境变量 `UPLOAD_DIR` 来调整
    pub upload_dir: String,

    /// 对外访问地址，拼接缩略图URL时使用
    ///
    /// 例如 `https://hub.example.com`，可通过环境变量 `PUBLIC_URL` 来调整
    pub public_url: String,
}

/// 程序配置
pub struct AppConfig {
    /// postgresql数据库链接字符串
    pub postgresql_conn_str: String,

    /// web服务监听地址
    pub server_addr: String,

    /// 统计卡片SVG模板路径
    pub stat_card_template: String,

    /// 存储配置
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Arc<AppConfig>> {
        // 加载.env文件中的数据注入到环境变量中，方便本地测试
        // 线上环境部署时直接使用环境变量，不需要.env文件
        dotenvy::dotenv().ok();

        // 读取数据库地址信息（仅支持postgresql）
        let db_url = std::env::var("DATABASE_URL")
            .context("Can not load DATABASE_URL in environment")
            .suggestion("设置 DATABASE_URL 环境变量")?;

        let config = AppConfig {
            postgresql_conn_str: db_url,
            server_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            stat_card_template: std::env::var("STAT_CARD_TEMPLATE")
                .unwrap_or_else(|_| "assets/stat-card.svg".to_string()),
            storage: StorageConfig {
                upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                public_url: std::env::var("PUBLIC_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            },
        };
        Ok(Arc::new(config))
    }
}
