//! 项目地址可达性探测

use std::time::Duration;
use tracing::debug;

/// 单次探测的超时时间
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// URL探测抽象，测试用打桩实现替换
#[async_trait::async_trait]
pub trait UrlCheckerTrait: Send + Sync + 'static {
    /// URL是否能正常访问（2xx响应）
    async fn is_reachable(&self, url: &str) -> bool;
}

/// 基于 [`reqwest`] 的真实探测
pub struct HttpUrlChecker {
    client: reqwest::Client,
}

impl HttpUrlChecker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpUrlChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UrlCheckerTrait for HttpUrlChecker {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("🌐 URL探测失败 {url}: {e}");
                false
            }
        }
    }
}
