//! 聚合服务
//!
//! [`HubService`] 持有仓库和外部适配器，三个服务 trait 的实现
//! 分别放在 project / code / mypage 模块里。

use crate::models::codes::CodeInfoRes;
use crate::models::err::AppError;
use crate::models::projects::ProjectInfoRes;
use crate::services::storage::StorageServiceTrait;
use crate::services::url_check::UrlCheckerTrait;
use database::models::{Code, Project, User};
use database::BackendRepository;

/// 聚合服务
///
/// 泛型注入仓库、缩略图存储和URL探测器：生产环境组合
/// `PgRepository` + `LocalStorageService` + `HttpUrlChecker`，
/// 测试组合内存实现和桩。
pub struct HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    pub(crate) repository: R,
    pub(crate) storage: ST,
    pub(crate) url_checker: U,
    /// 统计卡片SVG模板路径
    pub(crate) stat_card_template: String,
}

impl<R, ST, U> HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    pub fn new(repository: R, storage: ST, url_checker: U, stat_card_template: String) -> Self {
        Self {
            repository,
            storage,
            url_checker,
            stat_card_template,
        }
    }

    /// 查调用者对应的用户行，不存在按404处理
    pub(crate) async fn require_user(&self, user_id: i64) -> Result<User, AppError> {
        self.repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("用户 {user_id} 不存在")))
    }

    /// 给项目版本行批量配上标签名，组装成列表卡片
    pub(crate) async fn project_cards(
        &self,
        projects: Vec<Project>,
    ) -> Result<Vec<ProjectInfoRes>, AppError> {
        let ids: Vec<i64> = projects.iter().map(|p| p.project_id).collect();
        let tag_pairs = self.repository.tags_of_projects(&ids).await?;
        let cards = projects
            .iter()
            .map(|project| {
                let tags = tag_pairs
                    .iter()
                    .filter(|(project_id, _)| *project_id == project.project_id)
                    .map(|(_, tag)| tag.name.clone())
                    .collect();
                ProjectInfoRes::from_parts(project, tags)
            })
            .collect();
        Ok(cards)
    }

    /// 给代码版本行配上标签名、作者名和调用者的点赞状态
    pub(crate) async fn code_cards(
        &self,
        codes: Vec<Code>,
        viewer: Option<i64>,
    ) -> Result<Vec<CodeInfoRes>, AppError> {
        let ids: Vec<i64> = codes.iter().map(|c| c.code_id).collect();
        let tag_pairs = self.repository.tags_of_codes(&ids).await?;
        let liked_ids = match viewer {
            Some(user_id) => self.repository.liked_code_ids(user_id, &ids).await?,
            None => Vec::new(),
        };
        let mut cards = Vec::with_capacity(codes.len());
        for code in &codes {
            let tags = tag_pairs
                .iter()
                .filter(|(code_id, _)| *code_id == code.code_id)
                .map(|(_, tag)| tag.name.clone())
                .collect();
            let user_name = self
                .repository
                .find_user_by_id(code.user_id)
                .await?
                .map(|u| u.name)
                .unwrap_or_default();
            cards.push(CodeInfoRes::from_parts(
                code,
                user_name,
                tags,
                liked_ids.contains(&code.code_id),
            ));
        }
        Ok(cards)
    }
}

/// 解析逗号分隔的标签ID参数
pub(crate) fn parse_tag_ids(raw: &Option<String>) -> Result<Vec<i64>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("标签ID格式错误: {s}")))
        })
        .collect()
}
