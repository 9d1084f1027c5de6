//! 个人页服务
//!
//! 登录用户名下的项目/代码列表，以及对外分享用的 SVG 统计卡片。

use crate::models::codes::CodeInfoRes;
use crate::models::common::PageQuery;
use crate::models::err::AppError;
use crate::models::projects::ProjectInfoRes;
use crate::services::hub::HubService;
use crate::services::storage::StorageServiceTrait;
use crate::services::traits::{MypageServiceTrait, ServiceResult};
use crate::services::url_check::UrlCheckerTrait;
use color_eyre::eyre::eyre;
use database::models::UserStats;
use database::BackendRepository;
use tracing::debug;

/// 把模板里的六个统计占位符换成实际数字
fn render_stat_card(template: &str, stats: &UserStats) -> String {
    template
        .replace("${feedbackCnt}", &stats.feedback_cnt.to_string())
        .replace("${codeReviewCnt}", &stats.code_review_cnt.to_string())
        .replace(
            "${includedFeedbackCnt}",
            &stats.included_feedback_cnt.to_string(),
        )
        .replace(
            "${includedCodeReviewCnt}",
            &stats.included_code_review_cnt.to_string(),
        )
        .replace(
            "${projectRefactorCnt}",
            &stats.project_refactor_cnt.to_string(),
        )
        .replace("${codeRefactorCnt}", &stats.code_refactor_cnt.to_string())
}

#[async_trait::async_trait]
impl<R, ST, U> MypageServiceTrait for HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    async fn my_projects(
        &self,
        user_id: i64,
        page: PageQuery,
    ) -> ServiceResult<(Vec<ProjectInfoRes>, u32)> {
        self.require_user(user_id).await?;
        let result = self
            .repository
            .my_projects(user_id, page.page_size as i64, page.offset())
            .await?;
        let cards = self.project_cards(result.projects).await?;
        Ok((cards, result.total))
    }

    async fn my_favorite_projects(
        &self,
        user_id: i64,
        page: PageQuery,
    ) -> ServiceResult<(Vec<ProjectInfoRes>, u32)> {
        self.require_user(user_id).await?;
        let result = self
            .repository
            .my_favorite_projects(user_id, page.page_size as i64, page.offset())
            .await?;
        let cards = self.project_cards(result.projects).await?;
        Ok((cards, result.total))
    }

    async fn my_feedback_projects(
        &self,
        user_id: i64,
        page: PageQuery,
    ) -> ServiceResult<(Vec<ProjectInfoRes>, u32)> {
        self.require_user(user_id).await?;
        let result = self
            .repository
            .my_feedback_projects(user_id, page.page_size as i64, page.offset())
            .await?;
        let cards = self.project_cards(result.projects).await?;
        Ok((cards, result.total))
    }

    async fn my_codes(
        &self,
        user_id: i64,
        page: PageQuery,
    ) -> ServiceResult<(Vec<CodeInfoRes>, u32)> {
        self.require_user(user_id).await?;
        let result = self
            .repository
            .my_codes(user_id, page.page_size as i64, page.offset())
            .await?;
        let cards = self.code_cards(result.codes, Some(user_id)).await?;
        Ok((cards, result.total))
    }

    async fn my_favorite_codes(
        &self,
        user_id: i64,
        page: PageQuery,
    ) -> ServiceResult<(Vec<CodeInfoRes>, u32)> {
        self.require_user(user_id).await?;
        let result = self
            .repository
            .my_favorite_codes(user_id, page.page_size as i64, page.offset())
            .await?;
        let cards = self.code_cards(result.codes, Some(user_id)).await?;
        Ok((cards, result.total))
    }

    async fn my_review_codes(
        &self,
        user_id: i64,
        page: PageQuery,
    ) -> ServiceResult<(Vec<CodeInfoRes>, u32)> {
        self.require_user(user_id).await?;
        let result = self
            .repository
            .my_review_codes(user_id, page.page_size as i64, page.offset())
            .await?;
        let cards = self.code_cards(result.codes, Some(user_id)).await?;
        Ok((cards, result.total))
    }

    async fn make_stat_card(&self, user_name: &str) -> ServiceResult<String> {
        let user = self
            .repository
            .find_user_by_name(user_name)
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".to_string()))?;
        let stats = self.repository.user_stats(user.user_id).await?;
        let template = tokio::fs::read_to_string(&self.stat_card_template)
            .await
            .map_err(|e| AppError::InternalError(eyre!("统计卡片模板读取失败: {e}")))?;
        debug!("🖼️ 生成 {user_name} 的统计卡片");
        Ok(render_stat_card(&template, &stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::codes::{CodeReq, ReviewReq};
    use crate::models::projects::{FeedbackReq, ProjectReq};
    use crate::services::testing::{test_service, test_service_with, StubUrlChecker};
    use crate::services::traits::{CodeServiceTrait, ProjectServiceTrait};

    fn page(page_index: u32, page_size: u32) -> PageQuery {
        PageQuery {
            page_index,
            page_size,
        }
    }

    fn project_req(project_id: i64, title: &str) -> ProjectReq {
        ProjectReq {
            project_id,
            title: title.to_string(),
            introduction: "简介".to_string(),
            url: "https://example.com".to_string(),
            notice: "公告".to_string(),
            content: "正文".to_string(),
            selected_tags_id: None,
            selected_feedbacks_id: None,
        }
    }

    fn code_req(title: &str) -> CodeReq {
        CodeReq {
            code_id: -1,
            title: title.to_string(),
            content: "fn main() {}".to_string(),
            language: "rust".to_string(),
            project_id: None,
            selected_tags_id: None,
            selected_reviews_id: None,
        }
    }

    #[tokio::test]
    async fn project_lists_scoped_to_caller() {
        let (service, repo) = test_service();
        let alice = repo.seed_user("alice").await;
        let bob = repo.seed_user("bob").await;

        let project = service
            .insert_project(project_req(-1, "集市"), alice.user_id)
            .await
            .unwrap();
        service.favorite_project(project, bob.user_id).await.unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: project,
                    content: "建议".to_string(),
                },
                Some(bob.user_id),
            )
            .await
            .unwrap();

        let (mine, total) = service.my_projects(alice.user_id, page(1, 10)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(mine[0].project_id, project);
        let (empty, _) = service.my_projects(bob.user_id, page(1, 10)).await.unwrap();
        assert!(empty.is_empty());

        let (favorites, _) = service
            .my_favorite_projects(bob.user_id, page(1, 10))
            .await
            .unwrap();
        assert_eq!(favorites.len(), 1);

        let (feedbacked, _) = service
            .my_feedback_projects(bob.user_id, page(1, 10))
            .await
            .unwrap();
        assert_eq!(feedbacked.len(), 1);
        let (none, _) = service
            .my_feedback_projects(alice.user_id, page(1, 10))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn code_lists_scoped_to_caller() {
        let (service, repo) = test_service();
        let alice = repo.seed_user("alice").await;
        let bob = repo.seed_user("bob").await;

        let code = service
            .insert_code(code_req("排序"), alice.user_id)
            .await
            .unwrap();
        service.favorite_code(code, bob.user_id).await.unwrap();
        service
            .insert_review(
                ReviewReq {
                    code_id: code,
                    content: "评审".to_string(),
                },
                Some(bob.user_id),
            )
            .await
            .unwrap();

        let (mine, total) = service.my_codes(alice.user_id, page(1, 10)).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(mine[0].code_id, code);

        let (favorites, _) = service
            .my_favorite_codes(bob.user_id, page(1, 10))
            .await
            .unwrap();
        assert_eq!(favorites.len(), 1);

        let (reviewed, _) = service
            .my_review_codes(bob.user_id, page(1, 10))
            .await
            .unwrap();
        assert_eq!(reviewed.len(), 1);
    }

    #[tokio::test]
    async fn pagination_splits_pages() {
        let (service, repo) = test_service();
        let alice = repo.seed_user("alice").await;
        for title in ["一", "二", "三"] {
            service
                .insert_project(project_req(-1, title), alice.user_id)
                .await
                .unwrap();
        }

        let (first, total) = service.my_projects(alice.user_id, page(1, 2)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(first.len(), 2);
        let (second, _) = service.my_projects(alice.user_id, page(2, 2)).await.unwrap();
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn stat_card_renders_counts() {
        let path = std::env::temp_dir().join("stat-card-render-test.svg");
        tokio::fs::write(
            &path,
            "<svg>${feedbackCnt}/${codeReviewCnt}/${includedFeedbackCnt}/${includedCodeReviewCnt}/${projectRefactorCnt}/${codeRefactorCnt}</svg>",
        )
        .await
        .unwrap();
        let (service, repo) =
            test_service_with(StubUrlChecker(true), path.to_string_lossy().into_owned());
        let alice = repo.seed_user("alice").await;
        let bob = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), alice.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "建议".to_string(),
                },
                Some(bob.user_id),
            )
            .await
            .unwrap();
        let feedback_id = {
            use database::FeedbackRepositoryTrait;
            repo.feedbacks_of_project(v1).await.unwrap()[0].feedback_id
        };
        let mut req = project_req(v1, "集市");
        req.selected_feedbacks_id = Some(vec![feedback_id]);
        service.insert_project(req, alice.user_id).await.unwrap();

        let card = service.make_stat_card("bob").await.unwrap();
        assert_eq!(card, "<svg>1/0/1/0/0/0</svg>");
        let card = service.make_stat_card("alice").await.unwrap();
        assert_eq!(card, "<svg>0/0/0/0/1/0</svg>");
    }

    #[tokio::test]
    async fn stat_card_unknown_user_not_found() {
        let (service, _repo) = test_service();
        let err = service.make_stat_card("nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn stat_card_missing_template_is_internal_error() {
        let (service, repo) = test_service_with(
            StubUrlChecker(true),
            "/nonexistent/stat-card.svg".to_string(),
        );
        repo.seed_user("alice").await;
        let err = service.make_stat_card("alice").await.unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));
    }
}
