//! 缩略图存储
//!
//! 生产环境落本地磁盘，文件经 `/img` 静态路由对外提供。
//! 测试用打桩实现替换。

use shared_lib::StorageConfig;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// 存储操作错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// 文件写入失败
    #[error("缩略图写入失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 缩略图存储抽象
#[async_trait::async_trait]
pub trait StorageServiceTrait: Send + Sync + 'static {
    /// 保存文件内容，返回可公开访问的URL
    async fn save(&self, file_name: &str, data: &[u8]) -> Result<String, StorageError>;
}

/// 本地磁盘存储
pub struct LocalStorageService {
    upload_dir: PathBuf,
    public_url: String,
}

impl LocalStorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl StorageServiceTrait for LocalStorageService {
    async fn save(&self, file_name: &str, data: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        debug!("🖼️ 缩略图已落盘: {}", path.display());
        Ok(format!("{}/img/{}", self.public_url, file_name))
    }
}
