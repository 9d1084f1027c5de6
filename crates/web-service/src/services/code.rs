//! 代码服务
//!
//! 代码片段与评审的业务逻辑，版本组规则和项目侧一致。
//! 额外多出一条：代码可以挂到自己的某个项目版本下面。

use crate::models::codes::{
    CodeDetailRes, CodeInfoRes, CodeReq, CodeSearch, CodeVersionRes, ConnectedProjectRes,
    ReviewReq, ReviewRes, ReviewUpdateReq, SelectedReviewRes,
};
use crate::models::err::AppError;
use crate::models::projects::TagRes;
use crate::services::hub::{parse_tag_ids, HubService};
use crate::services::project::ensure_writer;
use crate::services::storage::StorageServiceTrait;
use crate::services::traits::{CodeServiceTrait, ServiceResult};
use crate::services::url_check::UrlCheckerTrait;
use database::models::{Code, CodeCreate, CodeSearchParams, CodeSortKey, CodeUpdate, Review};
use database::BackendRepository;
use tracing::debug;

fn ensure_code_writer(code: &Code, user_id: i64) -> Result<(), AppError> {
    if code.user_id != user_id {
        return Err(AppError::Forbidden(format!(
            "代码版本 {} 不属于用户 {user_id}",
            code.code_id
        )));
    }
    Ok(())
}

fn ensure_review_writer(review: &Review, user_id: i64) -> Result<(), AppError> {
    if review.user_id != Some(user_id) {
        return Err(AppError::Forbidden(format!(
            "评审 {} 不属于用户 {user_id}",
            review.review_id
        )));
    }
    Ok(())
}

fn parse_code_sort(raw: &Option<String>) -> Result<CodeSortKey, AppError> {
    match raw.as_deref() {
        None | Some("modifiedDate") => Ok(CodeSortKey::Modified),
        Some("likeCnt") => Ok(CodeSortKey::Likes),
        Some("reviewCnt") => Ok(CodeSortKey::Reviews),
        Some(other) => Err(AppError::BadRequest(format!("不支持的排序方式: {other}"))),
    }
}

impl<R, ST, U> HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    pub(crate) async fn require_code(&self, code_id: i64) -> Result<Code, AppError> {
        self.repository
            .find_code_by_id(code_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("代码版本 {code_id} 不存在")))
    }

    async fn require_review(&self, review_id: i64) -> Result<Review, AppError> {
        self.repository
            .find_review_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("评审 {review_id} 不存在")))
    }

    async fn check_newest_code_version(&self, code: &Code) -> Result<(), AppError> {
        let latest = self
            .repository
            .latest_code_version(code.num, code.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("代码版本组 {} 不存在", code.num)))?;
        if latest.code_id != code.code_id {
            return Err(AppError::NotNewestVersion(format!(
                "代码版本 {} 已被版本 {} 取代",
                code.code_id, latest.code_id
            )));
        }
        Ok(())
    }

    /// 代码只能挂在作者自己的项目版本上
    async fn validate_code_project_link(
        &self,
        project_id: Option<i64>,
        user_id: i64,
    ) -> Result<Option<i64>, AppError> {
        if let Some(project_id) = project_id {
            let project = self.require_project(project_id).await?;
            ensure_writer(&project, user_id)?;
        }
        Ok(project_id)
    }

    async fn register_code_tags(&self, code_id: i64, tag_ids: &[i64]) -> Result<(), AppError> {
        for tag_id in tag_ids {
            self.repository
                .find_code_tag(*tag_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("标签 {tag_id} 不存在")))?;
            self.repository
                .insert_code_selected_tag(code_id, *tag_id)
                .await?;
            self.repository.update_code_tag_cnt(*tag_id, 1).await?;
        }
        Ok(())
    }

    async fn unregister_code_tags(&self, code_id: i64) -> Result<(), AppError> {
        for selected in self.repository.find_code_selected_tags(code_id).await? {
            self.repository
                .update_code_tag_cnt(selected.tag_id, -1)
                .await?;
        }
        self.repository.delete_code_selected_tags(code_id).await?;
        Ok(())
    }

    async fn register_selected_reviews(
        &self,
        code_id: i64,
        num: i64,
        user_id: i64,
        review_ids: &[i64],
    ) -> Result<(), AppError> {
        for review_id in review_ids {
            let review = self.require_review(*review_id).await?;
            let target = self.require_code(review.code_id).await?;
            if target.num != num || target.user_id != user_id {
                return Err(AppError::BadRequest(format!(
                    "评审 {review_id} 不属于这段代码"
                )));
            }
            self.repository
                .update_review_selected(*review_id, 1)
                .await?;
            self.repository
                .insert_selected_review(code_id, *review_id)
                .await?;
        }
        Ok(())
    }

    async fn unregister_selected_reviews(&self, code_id: i64) -> Result<(), AppError> {
        for selected in self.repository.find_selected_reviews(code_id).await? {
            self.repository
                .update_review_selected(selected.review_id, -1)
                .await?;
        }
        self.repository.delete_selected_reviews(code_id).await?;
        Ok(())
    }

    /// 排序规则与项目反馈一致：采纳、自己的、时间倒序
    async fn review_entries(
        &self,
        code_id: i64,
        viewer: Option<i64>,
    ) -> Result<Vec<ReviewRes>, AppError> {
        let rows = self.repository.reviews_of_code(code_id).await?;
        let ids: Vec<i64> = rows.iter().map(|r| r.review_id).collect();
        let liked_ids = match viewer {
            Some(user_id) => self.repository.liked_review_ids(user_id, &ids).await?,
            None => Vec::new(),
        };
        let mut entries = Vec::with_capacity(rows.len());
        for review in rows {
            let user_name = match review.user_id {
                Some(writer_id) => self
                    .repository
                    .find_user_by_id(writer_id)
                    .await?
                    .map(|u| u.name),
                None => None,
            };
            entries.push(ReviewRes {
                review_id: review.review_id,
                user_id: review.user_id,
                user_name,
                content: review.content,
                selected: review.selected,
                like_cnt: review.like_cnt,
                liked: liked_ids.contains(&review.review_id),
                date: review.modified_at,
            });
        }
        entries.sort_by(|a, b| {
            let a_mine = a.user_id.is_some() && a.user_id == viewer;
            let b_mine = b.user_id.is_some() && b.user_id == viewer;
            b.selected
                .cmp(&a.selected)
                .then(b_mine.cmp(&a_mine))
                .then(b.date.cmp(&a.date))
        });
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl<R, ST, U> CodeServiceTrait for HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    async fn insert_code(&self, req: CodeReq, user_id: i64) -> ServiceResult<i64> {
        let user = self.require_user(user_id).await?;
        let project_id = self
            .validate_code_project_link(req.project_id, user_id)
            .await?;

        let (num, version, like_cnt) = if req.code_id == -1 {
            let serial = self.repository.bump_user_codes_cnt(user_id).await?;
            (serial, 1, 0)
        } else {
            let origin = self.require_code(req.code_id).await?;
            ensure_code_writer(&origin, user_id)?;
            let latest = self
                .repository
                .latest_code_version(origin.num, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("代码版本组 {} 不存在", origin.num)))?;
            self.repository
                .close_code_versions(origin.num, user_id)
                .await?;
            (origin.num, latest.version + 1, latest.like_cnt)
        };

        let code = self
            .repository
            .insert_code(CodeCreate {
                num,
                version,
                title: req.title,
                content: req.content,
                language: req.language,
                like_cnt,
                user_id,
                project_id,
            })
            .await?;

        self.register_code_tags(
            code.code_id,
            req.selected_tags_id.as_deref().unwrap_or_default(),
        )
        .await?;
        self.register_selected_reviews(
            code.code_id,
            num,
            user_id,
            req.selected_reviews_id.as_deref().unwrap_or_default(),
        )
        .await?;

        debug!(
            "📝 用户 {} 登记代码版本 {} (v{version})",
            user.name, code.code_id
        );
        Ok(code.code_id)
    }

    async fn update_code(&self, req: CodeReq, user_id: i64) -> ServiceResult<()> {
        self.require_user(user_id).await?;
        let code = self.require_code(req.code_id).await?;
        ensure_code_writer(&code, user_id)?;
        self.check_newest_code_version(&code).await?;
        let project_id = self
            .validate_code_project_link(req.project_id, user_id)
            .await?;

        self.unregister_code_tags(code.code_id).await?;
        self.register_code_tags(
            code.code_id,
            req.selected_tags_id.as_deref().unwrap_or_default(),
        )
        .await?;
        self.unregister_selected_reviews(code.code_id).await?;
        self.register_selected_reviews(
            code.code_id,
            code.num,
            user_id,
            req.selected_reviews_id.as_deref().unwrap_or_default(),
        )
        .await?;

        self.repository
            .update_code(
                code.code_id,
                CodeUpdate {
                    title: req.title,
                    content: req.content,
                    language: req.language,
                    project_id,
                },
            )
            .await?;

        debug!("🔄 代码版本 {} 已更新", code.code_id);
        Ok(())
    }

    async fn get_code_list(
        &self,
        search: CodeSearch,
        viewer: Option<i64>,
    ) -> ServiceResult<(Vec<CodeInfoRes>, u32)> {
        let params = CodeSearchParams {
            keyword: search.keyword.clone().unwrap_or_default(),
            tag_ids: parse_tag_ids(&search.tag_ids)?,
            include_closed: search.closed == Some(1),
            sort: parse_code_sort(&search.sort)?,
            page_size: search.page_size as i64,
            offset: (search.page_index.saturating_sub(1) as i64) * search.page_size as i64,
        };
        let result = self.repository.search_codes(&params).await?;
        let cards = self.code_cards(result.codes, viewer).await?;
        Ok((cards, result.total))
    }

    async fn get_code(&self, code_id: i64, viewer: Option<i64>) -> ServiceResult<CodeDetailRes> {
        let code = self.require_code(code_id).await?;
        let writer = self.require_user(code.user_id).await?;
        let tags = self
            .repository
            .tags_of_code(code_id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();

        let (liked, favorite) = match viewer {
            Some(user_id) => (
                self.repository.has_code_like(code_id, user_id).await?,
                self.repository.has_code_favorite(code_id, user_id).await?,
            ),
            None => (false, false),
        };

        let mut versions = Vec::new();
        for version in self
            .repository
            .find_code_versions(code.num, code.user_id)
            .await?
        {
            let selected_reviews = self
                .repository
                .selected_reviews_of(version.code_id)
                .await?
                .into_iter()
                .map(|r| SelectedReviewRes {
                    review_id: r.review_id,
                    content: r.content,
                })
                .collect();
            versions.push(CodeVersionRes {
                code_id: version.code_id,
                version: version.version,
                selected_reviews,
            });
        }

        let reviews = self.review_entries(code_id, viewer).await?;
        let connected_project = match code.project_id {
            Some(project_id) => self
                .repository
                .find_project_by_id(project_id)
                .await?
                .map(|p| ConnectedProjectRes {
                    project_id: p.project_id,
                    version: p.version,
                    title: p.title,
                    img: p.img,
                }),
            None => None,
        };

        Ok(CodeDetailRes {
            code_id: code.code_id,
            version: code.version,
            title: code.title,
            content: code.content,
            language: code.language,
            like_cnt: code.like_cnt,
            review_cnt: code.review_cnt,
            closed: code.closed,
            liked,
            favorite,
            user_id: writer.user_id,
            user_name: writer.name,
            date: code.modified_at,
            tags,
            versions,
            reviews,
            connected_project,
        })
    }

    async fn delete_code(&self, code_id: i64, user_id: i64) -> ServiceResult<()> {
        self.require_user(user_id).await?;
        let code = self.require_code(code_id).await?;
        ensure_code_writer(&code, user_id)?;
        self.check_newest_code_version(&code).await?;

        self.unregister_selected_reviews(code_id).await?;
        for review in self.repository.reviews_of_code(code_id).await? {
            self.repository.delete_review_likes(review.review_id).await?;
        }
        self.repository.delete_reviews_of_code(code_id).await?;
        self.unregister_code_tags(code_id).await?;
        self.repository.delete_code_likes(code_id).await?;
        self.repository.delete_code_favorites(code_id).await?;
        self.repository.delete_code(code_id).await?;

        if let Some(previous) = self
            .repository
            .latest_code_version(code.num, user_id)
            .await?
        {
            self.repository
                .reopen_code_version(previous.code_id)
                .await?;
        }

        debug!("🗑️ 代码版本 {code_id} 已删除");
        Ok(())
    }

    async fn like_code(&self, code_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        self.require_code(code_id).await?;
        let cnt = if self.repository.has_code_like(code_id, user_id).await? {
            self.repository.delete_code_like(code_id, user_id).await?;
            self.repository.update_code_like_cnt(code_id, -1).await?
        } else {
            self.repository.insert_code_like(code_id, user_id).await?;
            self.repository.update_code_like_cnt(code_id, 1).await?
        };
        Ok(cnt)
    }

    async fn favorite_code(&self, code_id: i64, user_id: i64) -> ServiceResult<i64> {
        self.require_user(user_id).await?;
        self.require_code(code_id).await?;
        if self.repository.has_code_favorite(code_id, user_id).await? {
            self.repository
                .delete_code_favorite(code_id, user_id)
                .await?;
        } else {
            self.repository
                .insert_code_favorite(code_id, user_id)
                .await?;
        }
        Ok(self.repository.count_code_favorites(code_id).await?)
    }

    async fn search_code_tags(&self, keyword: &str) -> ServiceResult<Vec<TagRes>> {
        let tags = self.repository.search_code_tags(keyword).await?;
        Ok(tags.into_iter().map(TagRes::from).collect())
    }

    async fn insert_review(&self, req: ReviewReq, viewer: Option<i64>) -> ServiceResult<i32> {
        if let Some(user_id) = viewer {
            self.require_user(user_id).await?;
        }
        self.require_code(req.code_id).await?;
        self.repository
            .insert_review(req.code_id, viewer, &req.content)
            .await?;
        let cnt = self
            .repository
            .update_code_review_cnt(req.code_id, 1)
            .await?;
        debug!("💬 代码版本 {} 新增评审，当前共 {cnt} 条", req.code_id);
        Ok(cnt)
    }

    async fn update_review(&self, req: ReviewUpdateReq, user_id: i64) -> ServiceResult<()> {
        self.require_user(user_id).await?;
        let review = self.require_review(req.review_id).await?;
        ensure_review_writer(&review, user_id)?;
        if review.selected > 0 {
            return Err(AppError::Conflict(format!(
                "评审 {} 已被采纳，不能修改",
                review.review_id
            )));
        }
        self.repository
            .update_review_content(review.review_id, &req.content)
            .await?;
        Ok(())
    }

    async fn delete_review(&self, review_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        let review = self.require_review(review_id).await?;
        ensure_review_writer(&review, user_id)?;
        if review.selected > 0 {
            return Err(AppError::Conflict(format!(
                "评审 {review_id} 已被采纳，不能删除"
            )));
        }
        self.repository.delete_review_likes(review_id).await?;
        self.repository.delete_review(review_id).await?;
        let cnt = self
            .repository
            .update_code_review_cnt(review.code_id, -1)
            .await?;
        Ok(cnt)
    }

    async fn like_review(&self, review_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        self.require_review(review_id).await?;
        let cnt = if self
            .repository
            .has_review_like(review_id, user_id)
            .await?
        {
            self.repository
                .delete_review_like(review_id, user_id)
                .await?;
            self.repository
                .update_review_like_cnt(review_id, -1)
                .await?
        } else {
            self.repository
                .insert_review_like(review_id, user_id)
                .await?;
            self.repository
                .update_review_like_cnt(review_id, 1)
                .await?
        };
        Ok(cnt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::projects::ProjectReq;
    use crate::services::testing::test_service;
    use crate::services::traits::ProjectServiceTrait;
    use database::{CodeRepositoryTrait, ReviewRepositoryTrait, TagRepositoryTrait};

    fn code_req(code_id: i64, title: &str) -> CodeReq {
        CodeReq {
            code_id,
            title: title.to_string(),
            content: "fn main() {}".to_string(),
            language: "rust".to_string(),
            project_id: None,
            selected_tags_id: None,
            selected_reviews_id: None,
        }
    }

    fn project_req(title: &str) -> ProjectReq {
        ProjectReq {
            project_id: -1,
            title: title.to_string(),
            introduction: "简介".to_string(),
            url: "https://example.com".to_string(),
            notice: "公告".to_string(),
            content: "正文".to_string(),
            selected_tags_id: None,
            selected_feedbacks_id: None,
        }
    }

    fn search_req(keyword: Option<&str>, sort: Option<&str>, closed: Option<i32>) -> CodeSearch {
        CodeSearch {
            keyword: keyword.map(str::to_string),
            tag_ids: None,
            closed,
            sort: sort.map(str::to_string),
            page_index: 1,
            page_size: 20,
        }
    }

    #[tokio::test]
    async fn register_new_code_starts_version_group() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let id = service
            .insert_code(code_req(-1, "快速排序"), writer.user_id)
            .await
            .unwrap();

        let code = repo.find_code_by_id(id).await.unwrap().unwrap();
        assert_eq!(code.num, 1);
        assert_eq!(code.version, 1);
        assert!(!code.closed);
        assert_eq!(code.project_id, None);
    }

    #[tokio::test]
    async fn upgrade_closes_previous_code_and_carries_likes() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        service.like_code(v1, fan.user_id).await.unwrap();

        let v2 = service
            .insert_code(code_req(v1, "排序"), writer.user_id)
            .await
            .unwrap();

        let first = repo.find_code_by_id(v1).await.unwrap().unwrap();
        let second = repo.find_code_by_id(v2).await.unwrap().unwrap();
        assert!(first.closed);
        assert!(!second.closed);
        assert_eq!(second.version, 2);
        assert_eq!(second.like_cnt, 1);
    }

    #[tokio::test]
    async fn update_requires_newest_code_version() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_code(code_req(v1, "排序"), writer.user_id)
            .await
            .unwrap();

        let err = service
            .update_code(code_req(v1, "旧版"), writer.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotNewestVersion(_)));
    }

    #[tokio::test]
    async fn project_link_requires_ownership() {
        let (service, repo) = test_service();
        let alice = repo.seed_user("alice").await;
        let carol = repo.seed_user("carol").await;
        let foreign = service
            .insert_project(project_req("别人的项目"), carol.user_id)
            .await
            .unwrap();
        let mine = service
            .insert_project(project_req("我的项目"), alice.user_id)
            .await
            .unwrap();

        let mut req = code_req(-1, "排序");
        req.project_id = Some(foreign);
        let err = service.insert_code(req, alice.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut req = code_req(-1, "排序");
        req.project_id = Some(9999);
        let err = service.insert_code(req, alice.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let mut req = code_req(-1, "排序");
        req.project_id = Some(mine);
        let id = service.insert_code(req, alice.user_id).await.unwrap();
        let detail = service.get_code(id, None).await.unwrap();
        let connected = detail.connected_project.unwrap();
        assert_eq!(connected.project_id, mine);
        assert_eq!(connected.title, "我的项目");
    }

    #[tokio::test]
    async fn code_tags_counted_per_active_version() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let algo = repo.seed_code_tag("算法").await;

        let mut req = code_req(-1, "排序");
        req.selected_tags_id = Some(vec![algo.tag_id]);
        let v1 = service.insert_code(req, writer.user_id).await.unwrap();
        assert_eq!(
            repo.find_code_tag(algo.tag_id).await.unwrap().unwrap().cnt,
            1
        );

        let req = code_req(v1, "排序");
        service.update_code(req, writer.user_id).await.unwrap();
        assert_eq!(
            repo.find_code_tag(algo.tag_id).await.unwrap().unwrap().cnt,
            0
        );
    }

    #[tokio::test]
    async fn selected_review_locked_against_edit() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reviewer = repo.seed_user("bob").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_review(
                ReviewReq {
                    code_id: v1,
                    content: "建议用迭代".to_string(),
                },
                Some(reviewer.user_id),
            )
            .await
            .unwrap();
        let review_id = repo.reviews_of_code(v1).await.unwrap()[0].review_id;

        let mut req = code_req(v1, "排序");
        req.selected_reviews_id = Some(vec![review_id]);
        let v2 = service.insert_code(req, writer.user_id).await.unwrap();

        let review = repo.find_review_by_id(review_id).await.unwrap().unwrap();
        assert_eq!(review.selected, 1);
        assert_eq!(repo.selected_reviews_of(v2).await.unwrap().len(), 1);

        let err = service
            .update_review(
                ReviewUpdateReq {
                    review_id,
                    content: "改了".to_string(),
                },
                reviewer.user_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .delete_review(review_id, reviewer.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn anonymous_review_counts() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        let cnt = service
            .insert_review(
                ReviewReq {
                    code_id: v1,
                    content: "路过的评审".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(cnt, 1);
        let review = &repo.reviews_of_code(v1).await.unwrap()[0];
        assert_eq!(review.user_id, None);
        let code = repo.find_code_by_id(v1).await.unwrap().unwrap();
        assert_eq!(code.review_cnt, 1);
    }

    #[tokio::test]
    async fn delete_code_cleans_reviews_and_reopens_previous() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reviewer = repo.seed_user("bob").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        let v2 = service
            .insert_code(code_req(v1, "排序"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_review(
                ReviewReq {
                    code_id: v2,
                    content: "评审".to_string(),
                },
                Some(reviewer.user_id),
            )
            .await
            .unwrap();
        let review_id = repo.reviews_of_code(v2).await.unwrap()[0].review_id;

        let err = service.delete_code(v1, writer.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotNewestVersion(_)));

        service.delete_code(v2, writer.user_id).await.unwrap();
        assert!(repo.find_code_by_id(v2).await.unwrap().is_none());
        assert!(repo.find_review_by_id(review_id).await.unwrap().is_none());
        let survivor = repo.find_code_by_id(v1).await.unwrap().unwrap();
        assert!(!survivor.closed);
    }

    #[tokio::test]
    async fn like_and_favorite_code_toggle() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();

        assert_eq!(service.like_code(v1, fan.user_id).await.unwrap(), 1);
        assert_eq!(service.like_code(v1, fan.user_id).await.unwrap(), 0);
        assert_eq!(service.favorite_code(v1, fan.user_id).await.unwrap(), 1);
        assert_eq!(service.favorite_code(v1, fan.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_codes_by_keyword_and_sort() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let sort_code = service
            .insert_code(code_req(-1, "快速排序"), writer.user_id)
            .await
            .unwrap();
        let tree_code = service
            .insert_code(code_req(-1, "红黑树"), writer.user_id)
            .await
            .unwrap();
        service.like_code(tree_code, fan.user_id).await.unwrap();

        let (cards, total) = service
            .get_code_list(search_req(Some("排序"), None, None), None)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(cards[0].code_id, sort_code);

        let (cards, _) = service
            .get_code_list(search_req(None, Some("likeCnt"), None), Some(fan.user_id))
            .await
            .unwrap();
        assert_eq!(cards[0].code_id, tree_code);
        assert!(cards[0].liked);

        let err = service
            .get_code_list(search_req(None, Some("stars"), None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn review_order_selected_then_mine_then_newest() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let bob = repo.seed_user("bob").await;
        let carol = repo.seed_user("carol").await;

        let v1 = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        for (user, content) in [
            (bob.user_id, "第一条"),
            (carol.user_id, "第二条"),
            (bob.user_id, "第三条"),
        ] {
            service
                .insert_review(
                    ReviewReq {
                        code_id: v1,
                        content: content.to_string(),
                    },
                    Some(user),
                )
                .await
                .unwrap();
        }
        let first_id = repo
            .reviews_of_code(v1)
            .await
            .unwrap()
            .iter()
            .find(|r| r.content == "第一条")
            .map(|r| r.review_id)
            .unwrap();

        let mut req = code_req(v1, "排序");
        req.selected_reviews_id = Some(vec![first_id]);
        service.insert_code(req, writer.user_id).await.unwrap();

        let detail = service.get_code(v1, Some(bob.user_id)).await.unwrap();
        let contents: Vec<&str> = detail.reviews.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["第一条", "第三条", "第二条"]);
    }
}
