//! 服务层模块
//!
//! 包含业务逻辑的服务层实现，遵循六边形架构原则

pub mod code;
pub mod hub;
pub mod mypage;
pub mod project;
pub mod storage;
pub mod traits;
pub mod url_check;

pub use hub::HubService;
pub use storage::{LocalStorageService, StorageServiceTrait};
pub use traits::{BackendService, CodeServiceTrait, MypageServiceTrait, ProjectServiceTrait};
pub use url_check::{HttpUrlChecker, UrlCheckerTrait};

/// 单元测试共用的服务装配：内存仓库加上桩存储和桩探测器
#[cfg(test)]
pub(crate) mod testing {
    use super::hub::HubService;
    use super::storage::{StorageError, StorageServiceTrait};
    use super::url_check::UrlCheckerTrait;
    use database::MemoryRepository;

    pub(crate) struct StubStorage;

    #[async_trait::async_trait]
    impl StorageServiceTrait for StubStorage {
        async fn save(&self, file_name: &str, _data: &[u8]) -> Result<String, StorageError> {
            Ok(format!("http://img.test/img/{file_name}"))
        }
    }

    pub(crate) struct StubUrlChecker(pub bool);

    #[async_trait::async_trait]
    impl UrlCheckerTrait for StubUrlChecker {
        async fn is_reachable(&self, _url: &str) -> bool {
            self.0
        }
    }

    pub(crate) type TestService = HubService<MemoryRepository, StubStorage, StubUrlChecker>;

    pub(crate) fn test_service() -> (TestService, MemoryRepository) {
        test_service_with(StubUrlChecker(true), String::new())
    }

    pub(crate) fn test_service_with(
        checker: StubUrlChecker,
        stat_card_template: String,
    ) -> (TestService, MemoryRepository) {
        let repository = MemoryRepository::default();
        let service = HubService::new(
            repository.clone(),
            StubStorage,
            checker,
            stat_card_template,
        );
        (service, repository)
    }
}
