//! 项目服务
//!
//! 项目/反馈相关的业务逻辑：版本组的登记、升级、关闭与重开，
//! 标签/采纳计数器的增减，以及作者权限检查都在这一层收口。
//! 仓库层只做行级读写，不承担这些规则。

use crate::models::err::AppError;
use crate::models::projects::{
    ConnectedCodeRes, FeedbackInfoRes, FeedbackReq, FeedbackRes, FeedbackUpdateReq,
    ProjectDetailRes, ProjectInfoRes, ProjectReq, ProjectSearch, SelectedFeedbackRes, TagRes,
    VersionRes,
};
use crate::services::hub::{parse_tag_ids, HubService};
use crate::services::storage::StorageServiceTrait;
use crate::services::traits::{ProjectServiceTrait, ServiceResult};
use crate::services::url_check::UrlCheckerTrait;
use database::models::{
    Feedback, Project, ProjectCreate, ProjectSearchParams, ProjectSortKey, ProjectUpdate,
};
use database::BackendRepository;
use tracing::debug;

/// 项目版本行只能由作者本人操作
pub(crate) fn ensure_writer(project: &Project, user_id: i64) -> Result<(), AppError> {
    if project.user_id != user_id {
        return Err(AppError::Forbidden(format!(
            "项目版本 {} 不属于用户 {user_id}",
            project.project_id
        )));
    }
    Ok(())
}

/// 反馈只能由写它的人修改，匿名反馈没有作者
fn ensure_feedback_writer(feedback: &Feedback, user_id: i64) -> Result<(), AppError> {
    if feedback.user_id != Some(user_id) {
        return Err(AppError::Forbidden(format!(
            "反馈 {} 不属于用户 {user_id}",
            feedback.feedback_id
        )));
    }
    Ok(())
}

fn parse_project_sort(raw: &Option<String>) -> Result<ProjectSortKey, AppError> {
    match raw.as_deref() {
        None | Some("modifiedDate") => Ok(ProjectSortKey::Modified),
        Some("likeCnt") => Ok(ProjectSortKey::Likes),
        Some("feedbackCnt") => Ok(ProjectSortKey::Feedbacks),
        Some(other) => Err(AppError::BadRequest(format!("不支持的排序方式: {other}"))),
    }
}

impl<R, ST, U> HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    pub(crate) async fn require_project(&self, project_id: i64) -> Result<Project, AppError> {
        self.repository
            .find_project_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("项目版本 {project_id} 不存在")))
    }

    pub(crate) async fn require_feedback(&self, feedback_id: i64) -> Result<Feedback, AppError> {
        self.repository
            .find_feedback_by_id(feedback_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("反馈 {feedback_id} 不存在")))
    }

    /// 操作目标必须是版本组的最新版本
    async fn check_newest_version(&self, project: &Project) -> Result<(), AppError> {
        let latest = self
            .repository
            .latest_project_version(project.num, project.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("项目版本组 {} 不存在", project.num)))?;
        if latest.project_id != project.project_id {
            return Err(AppError::NotNewestVersion(format!(
                "项目版本 {} 已被版本 {} 取代",
                project.project_id, latest.project_id
            )));
        }
        Ok(())
    }

    /// 给版本登记标签，词表计数同步加一
    async fn register_project_tags(
        &self,
        project_id: i64,
        tag_ids: &[i64],
    ) -> Result<(), AppError> {
        for tag_id in tag_ids {
            self.repository
                .find_project_tag(*tag_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("标签 {tag_id} 不存在")))?;
            self.repository
                .insert_project_selected_tag(project_id, *tag_id)
                .await?;
            self.repository.update_project_tag_cnt(*tag_id, 1).await?;
        }
        Ok(())
    }

    /// 清空版本的标签关联，词表计数同步减一
    async fn unregister_project_tags(&self, project_id: i64) -> Result<(), AppError> {
        for selected in self.repository.find_project_selected_tags(project_id).await? {
            self.repository
                .update_project_tag_cnt(selected.tag_id, -1)
                .await?;
        }
        self.repository
            .delete_project_selected_tags(project_id)
            .await?;
        Ok(())
    }

    /// 登记版本采纳的反馈，反馈必须挂在同一个版本组下
    async fn register_selected_feedbacks(
        &self,
        project_id: i64,
        num: i64,
        user_id: i64,
        feedback_ids: &[i64],
    ) -> Result<(), AppError> {
        for feedback_id in feedback_ids {
            let feedback = self.require_feedback(*feedback_id).await?;
            let target = self.require_project(feedback.project_id).await?;
            if target.num != num || target.user_id != user_id {
                return Err(AppError::BadRequest(format!(
                    "反馈 {feedback_id} 不属于这个项目"
                )));
            }
            self.repository
                .update_feedback_selected(*feedback_id, 1)
                .await?;
            self.repository
                .insert_selected_feedback(project_id, *feedback_id)
                .await?;
        }
        Ok(())
    }

    /// 撤销版本的全部采纳关联
    async fn unregister_selected_feedbacks(&self, project_id: i64) -> Result<(), AppError> {
        for selected in self.repository.find_selected_feedbacks(project_id).await? {
            self.repository
                .update_feedback_selected(selected.feedback_id, -1)
                .await?;
        }
        self.repository.delete_selected_feedbacks(project_id).await?;
        Ok(())
    }

    /// 版本收到的反馈：采纳多的在前，调用者自己的提前，其余按时间倒序
    async fn feedback_entries(
        &self,
        project_id: i64,
        viewer: Option<i64>,
    ) -> Result<Vec<FeedbackRes>, AppError> {
        let rows = self.repository.feedbacks_of_project(project_id).await?;
        let ids: Vec<i64> = rows.iter().map(|f| f.feedback_id).collect();
        let liked_ids = match viewer {
            Some(user_id) => self.repository.liked_feedback_ids(user_id, &ids).await?,
            None => Vec::new(),
        };
        let mut entries = Vec::with_capacity(rows.len());
        for feedback in rows {
            let user_name = match feedback.user_id {
                Some(writer_id) => self
                    .repository
                    .find_user_by_id(writer_id)
                    .await?
                    .map(|u| u.name),
                None => None,
            };
            entries.push(FeedbackRes {
                feedback_id: feedback.feedback_id,
                user_id: feedback.user_id,
                user_name,
                content: feedback.content,
                selected: feedback.selected,
                like_cnt: feedback.like_cnt,
                liked: liked_ids.contains(&feedback.feedback_id),
                date: feedback.modified_at,
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
impl<R, ST, U> ProjectServiceTrait for HubService<R, ST, U>
where
    R: BackendRepository,
    ST: StorageServiceTrait,
    U: UrlCheckerTrait,
{
    async fn insert_project(&self, req: ProjectReq, user_id: i64) -> ServiceResult<i64> {
        let user = self.require_user(user_id).await?;

        // 新项目用登记总数当版本组号；升级则先关闭组内现有版本
        let (num, version, like_cnt) = if req.project_id == -1 {
            let serial = self.repository.bump_user_projects_cnt(user_id).await?;
            (serial, 1, 0)
        } else {
            let origin = self.require_project(req.project_id).await?;
            ensure_writer(&origin, user_id)?;
            let latest = self
                .repository
                .latest_project_version(origin.num, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("项目版本组 {} 不存在", origin.num)))?;
            self.repository
                .close_project_versions(origin.num, user_id)
                .await?;
            (origin.num, latest.version + 1, latest.like_cnt)
        };

        let project = self
            .repository
            .insert_project(ProjectCreate {
                num,
                version,
                title: req.title,
                introduction: req.introduction,
                like_cnt,
                user_id,
                url: req.url,
                notice: req.notice,
                content: req.content,
            })
            .await?;

        self.register_project_tags(
            project.project_id,
            req.selected_tags_id.as_deref().unwrap_or_default(),
        )
        .await?;
        self.register_selected_feedbacks(
            project.project_id,
            num,
            user_id,
            req.selected_feedbacks_id.as_deref().unwrap_or_default(),
        )
        .await?;

        debug!(
            "📝 用户 {} 登记项目版本 {} (v{version})",
            user.name, project.project_id
        );
        Ok(project.project_id)
    }

    async fn update_project(&self, req: ProjectReq, user_id: i64) -> ServiceResult<()> {
        self.require_user(user_id).await?;
        let project = self.require_project(req.project_id).await?;
        ensure_writer(&project, user_id)?;
        self.check_newest_version(&project).await?;
        self.repository
            .find_project_info(project.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("项目详情 {} 不存在", project.project_id)))?;

        // 标签和采纳关联整体重建
        self.unregister_project_tags(project.project_id).await?;
        self.register_project_tags(
            project.project_id,
            req.selected_tags_id.as_deref().unwrap_or_default(),
        )
        .await?;
        self.unregister_selected_feedbacks(project.project_id).await?;
        self.register_selected_feedbacks(
            project.project_id,
            project.num,
            user_id,
            req.selected_feedbacks_id.as_deref().unwrap_or_default(),
        )
        .await?;

        self.repository
            .update_project(
                project.project_id,
                ProjectUpdate {
                    title: req.title,
                    introduction: req.introduction,
                    url: req.url,
                    notice: req.notice,
                    content: req.content,
                },
            )
            .await?;

        debug!("🔄 项目版本 {} 已更新", project.project_id);
        Ok(())
    }

    async fn get_project_list(
        &self,
        search: ProjectSearch,
    ) -> ServiceResult<(Vec<ProjectInfoRes>, u32)> {
        let params = ProjectSearchParams {
            keyword: search.keyword.clone().unwrap_or_default(),
            tag_ids: parse_tag_ids(&search.tag_ids)?,
            include_closed: search.closed == Some(1),
            sort: parse_project_sort(&search.sort)?,
            page_size: search.page_size as i64,
            offset: (search.page_index.saturating_sub(1) as i64) * search.page_size as i64,
        };
        let result = self.repository.search_projects(&params).await?;
        let cards = self.project_cards(result.projects).await?;
        Ok((cards, result.total))
    }

    async fn get_project(
        &self,
        project_id: i64,
        viewer: Option<i64>,
    ) -> ServiceResult<ProjectDetailRes> {
        let project = self.require_project(project_id).await?;
        let info = self
            .repository
            .find_project_info(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("项目详情 {project_id} 不存在")))?;
        let writer = self.require_user(project.user_id).await?;
        let tags = self
            .repository
            .tags_of_project(project_id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();

        let (liked, favorite) = match viewer {
            Some(user_id) => (
                self.repository.has_project_like(project_id, user_id).await?,
                self.repository
                    .has_project_favorite(project_id, user_id)
                    .await?,
            ),
            None => (false, false),
        };

        // 版本组历史，每个版本带上公告和当时采纳的反馈
        let mut versions = Vec::new();
        for version in self
            .repository
            .find_project_versions(project.num, project.user_id)
            .await?
        {
            let notice = self
                .repository
                .find_project_info(version.project_id)
                .await?
                .map(|i| i.notice)
                .unwrap_or_default();
            let selected_feedbacks = self
                .repository
                .selected_feedbacks_of(version.project_id)
                .await?
                .into_iter()
                .map(|f| SelectedFeedbackRes {
                    feedback_id: f.feedback_id,
                    content: f.content,
                })
                .collect();
            versions.push(VersionRes {
                project_id: version.project_id,
                version: version.version,
                notice,
                selected_feedbacks,
            });
        }

        let feedbacks = self.feedback_entries(project_id, viewer).await?;
        let connected_codes = self
            .repository
            .codes_of_project(project_id)
            .await?
            .into_iter()
            .map(|c| ConnectedCodeRes {
                code_id: c.code_id,
                version: c.version,
                title: c.title,
                language: c.language,
            })
            .collect();

        Ok(ProjectDetailRes {
            project_id: project.project_id,
            version: project.version,
            title: project.title,
            introduction: project.introduction,
            img: project.img,
            url: info.url,
            notice: info.notice,
            content: info.content,
            like_cnt: project.like_cnt,
            feedback_cnt: project.feedback_cnt,
            closed: project.closed,
            liked,
            favorite,
            user_id: writer.user_id,
            user_name: writer.name,
            date: project.modified_at,
            tags,
            versions,
            feedbacks,
            connected_codes,
        })
    }

    async fn delete_project(&self, project_id: i64, user_id: i64) -> ServiceResult<()> {
        self.require_user(user_id).await?;
        let project = self.require_project(project_id).await?;
        ensure_writer(&project, user_id)?;
        self.check_newest_version(&project).await?;

        // 先摘采纳关联，再清反馈、标签和外部引用，最后删行
        self.unregister_selected_feedbacks(project_id).await?;
        for feedback in self.repository.feedbacks_of_project(project_id).await? {
            self.repository
                .delete_feedback_likes(feedback.feedback_id)
                .await?;
            self.repository
                .delete_feedback_complains(feedback.feedback_id)
                .await?;
        }
        self.repository.delete_feedbacks_of_project(project_id).await?;
        self.unregister_project_tags(project_id).await?;
        self.repository.clear_project_links(project_id).await?;
        self.repository.delete_project_likes(project_id).await?;
        self.repository.delete_project_favorites(project_id).await?;
        self.repository.delete_project_info(project_id).await?;
        self.repository.delete_project(project_id).await?;

        // 删掉的是头部版本时，让剩下的最新版本重新打开
        if let Some(previous) = self
            .repository
            .latest_project_version(project.num, user_id)
            .await?
        {
            self.repository
                .reopen_project_version(previous.project_id)
                .await?;
        }

        debug!("🗑️ 项目版本 {project_id} 已删除");
        Ok(())
    }

    async fn update_thumbnail(
        &self,
        project_id: i64,
        user_id: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> ServiceResult<String> {
        if data.is_empty() {
            return Err(AppError::BadRequest("缩略图内容为空".to_string()));
        }
        let user = self.require_user(user_id).await?;
        let project = self.require_project(project_id).await?;
        ensure_writer(&project, user_id)?;
        self.check_newest_version(&project).await?;

        // 文件名固定为 作者_版本组_版本号，同版本重复上传直接覆盖
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let target = format!("{}_{}_{}.{ext}", user.name, project.num, project.version);
        let url = self.storage.save(&target, &data).await?;
        self.repository.update_project_img(project_id, &url).await?;

        debug!("🖼️ 项目版本 {project_id} 缩略图更新为 {url}");
        Ok(url)
    }

    async fn connect_codes(
        &self,
        project_id: i64,
        user_id: i64,
        code_ids: Vec<i64>,
    ) -> ServiceResult<u32> {
        if code_ids.is_empty() {
            return Err(AppError::BadRequest("要关联的代码列表为空".to_string()));
        }
        self.require_user(user_id).await?;
        let project = self.require_project(project_id).await?;
        ensure_writer(&project, user_id)?;

        // 先整体校验再落库，避免关联到一半失败
        for code_id in &code_ids {
            self.repository
                .find_code_by_id(*code_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("代码版本 {code_id} 不存在")))?;
        }
        for code_id in &code_ids {
            self.repository
                .set_code_project(*code_id, Some(project_id))
                .await?;
        }

        debug!("🔗 项目版本 {project_id} 关联了 {} 个代码", code_ids.len());
        Ok(code_ids.len() as u32)
    }

    async fn like_project(&self, project_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        self.require_project(project_id).await?;
        let cnt = if self.repository.has_project_like(project_id, user_id).await? {
            self.repository
                .delete_project_like(project_id, user_id)
                .await?;
            self.repository.update_project_like_cnt(project_id, -1).await?
        } else {
            self.repository
                .insert_project_like(project_id, user_id)
                .await?;
            self.repository.update_project_like_cnt(project_id, 1).await?
        };
        Ok(cnt)
    }

    async fn favorite_project(&self, project_id: i64, user_id: i64) -> ServiceResult<i64> {
        self.require_user(user_id).await?;
        self.require_project(project_id).await?;
        if self
            .repository
            .has_project_favorite(project_id, user_id)
            .await?
        {
            self.repository
                .delete_project_favorite(project_id, user_id)
                .await?;
        } else {
            self.repository
                .insert_project_favorite(project_id, user_id)
                .await?;
        }
        Ok(self.repository.count_project_favorites(project_id).await?)
    }

    async fn is_project_open(&self, project_id: i64) -> ServiceResult<i32> {
        let project = self.require_project(project_id).await?;
        Ok(if project.closed { 0 } else { 1 })
    }

    async fn check_project_url(&self, url: &str, user_id: i64) -> ServiceResult<bool> {
        self.require_user(user_id).await?;
        Ok(self.url_checker.is_reachable(url).await)
    }

    async fn search_project_tags(&self, keyword: &str) -> ServiceResult<Vec<TagRes>> {
        let tags = self.repository.search_project_tags(keyword).await?;
        Ok(tags.into_iter().map(TagRes::from).collect())
    }

    async fn insert_feedback(&self, req: FeedbackReq, viewer: Option<i64>) -> ServiceResult<i32> {
        if let Some(user_id) = viewer {
            self.require_user(user_id).await?;
        }
        self.require_project(req.project_id).await?;
        self.repository
            .insert_feedback(req.project_id, viewer, &req.content)
            .await?;
        let cnt = self
            .repository
            .update_project_feedback_cnt(req.project_id, 1)
            .await?;
        debug!("💬 项目版本 {} 新增反馈，当前共 {cnt} 条", req.project_id);
        Ok(cnt)
    }

    async fn update_feedback(&self, req: FeedbackUpdateReq, user_id: i64) -> ServiceResult<()> {
        self.require_user(user_id).await?;
        let feedback = self.require_feedback(req.feedback_id).await?;
        ensure_feedback_writer(&feedback, user_id)?;
        if feedback.selected > 0 {
            return Err(AppError::Conflict(format!(
                "反馈 {} 已被采纳，不能修改",
                feedback.feedback_id
            )));
        }
        self.repository
            .update_feedback_content(feedback.feedback_id, &req.content)
            .await?;
        Ok(())
    }

    async fn delete_feedback(&self, feedback_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        let feedback = self.require_feedback(feedback_id).await?;
        ensure_feedback_writer(&feedback, user_id)?;
        if feedback.selected > 0 {
            return Err(AppError::Conflict(format!(
                "反馈 {feedback_id} 已被采纳，不能删除"
            )));
        }
        self.repository.delete_feedback_likes(feedback_id).await?;
        self.repository.delete_feedback_complains(feedback_id).await?;
        self.repository.delete_feedback(feedback_id).await?;
        let cnt = self
            .repository
            .update_project_feedback_cnt(feedback.project_id, -1)
            .await?;
        Ok(cnt)
    }

    async fn get_feedback_list(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> ServiceResult<Vec<FeedbackInfoRes>> {
        self.require_user(user_id).await?;
        let project = self.require_project(project_id).await?;

        // 按 (版本组, 调用者) 查版本，别人的项目自然得到空列表
        let mut entries = Vec::new();
        for version in self
            .repository
            .find_project_versions(project.num, user_id)
            .await?
        {
            for feedback in self
                .repository
                .feedbacks_of_project(version.project_id)
                .await?
            {
                let user_name = match feedback.user_id {
                    Some(writer_id) => self
                        .repository
                        .find_user_by_id(writer_id)
                        .await?
                        .map(|u| u.name),
                    None => None,
                };
                entries.push(FeedbackInfoRes {
                    feedback_id: feedback.feedback_id,
                    version: version.version,
                    user_name,
                    content: feedback.content,
                    selected: feedback.selected,
                    like_cnt: feedback.like_cnt,
                    complained: feedback.complained,
                    date: feedback.modified_at,
                });
            }
        }
        Ok(entries)
    }

    async fn like_feedback(&self, feedback_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        self.require_feedback(feedback_id).await?;
        let cnt = if self
            .repository
            .has_feedback_like(feedback_id, user_id)
            .await?
        {
            self.repository
                .delete_feedback_like(feedback_id, user_id)
                .await?;
            self.repository
                .update_feedback_like_cnt(feedback_id, -1)
                .await?
        } else {
            self.repository
                .insert_feedback_like(feedback_id, user_id)
                .await?;
            self.repository
                .update_feedback_like_cnt(feedback_id, 1)
                .await?
        };
        Ok(cnt)
    }

    async fn complain_feedback(&self, feedback_id: i64, user_id: i64) -> ServiceResult<i32> {
        self.require_user(user_id).await?;
        self.require_feedback(feedback_id).await?;
        if self
            .repository
            .has_feedback_complain(feedback_id, user_id)
            .await?
        {
            return Err(AppError::Conflict(format!("已经投诉过反馈 {feedback_id}")));
        }
        self.repository
            .insert_feedback_complain(feedback_id, user_id)
            .await?;
        let cnt = self
            .repository
            .update_feedback_complained(feedback_id, 1)
            .await?;
        Ok(cnt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::codes::CodeReq;
    use crate::services::testing::{test_service, test_service_with, StubUrlChecker};
    use crate::services::traits::CodeServiceTrait;
    use database::{
        CodeRepositoryTrait, FeedbackRepositoryTrait, ProjectRepositoryTrait, TagRepositoryTrait,
    };

    fn project_req(project_id: i64, title: &str) -> ProjectReq {
        ProjectReq {
            project_id,
            title: title.to_string(),
            introduction: "一句话简介".to_string(),
            url: "https://example.com".to_string(),
            notice: "公告".to_string(),
            content: "正文".to_string(),
            selected_tags_id: None,
            selected_feedbacks_id: None,
        }
    }

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

    fn search_req(keyword: Option<&str>, sort: Option<&str>, closed: Option<i32>) -> ProjectSearch {
        ProjectSearch {
            keyword: keyword.map(str::to_string),
            tag_ids: None,
            closed,
            sort: sort.map(str::to_string),
            page_index: 1,
            page_size: 20,
        }
    }

    #[tokio::test]
    async fn register_new_project_starts_version_group() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let id = service
            .insert_project(project_req(-1, "代码集市"), writer.user_id)
            .await
            .unwrap();

        let project = repo.find_project_by_id(id).await.unwrap().unwrap();
        assert_eq!(project.num, 1);
        assert_eq!(project.version, 1);
        assert_eq!(project.like_cnt, 0);
        assert!(!project.closed);
    }

    #[tokio::test]
    async fn upgrade_closes_previous_and_carries_likes() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        service.like_project(v1, fan.user_id).await.unwrap();

        let v2 = service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();

        let first = repo.find_project_by_id(v1).await.unwrap().unwrap();
        let second = repo.find_project_by_id(v2).await.unwrap().unwrap();
        assert!(first.closed);
        assert!(!second.closed);
        assert_eq!(second.num, first.num);
        assert_eq!(second.version, 2);
        assert_eq!(second.like_cnt, 1);
    }

    #[tokio::test]
    async fn upgrade_by_other_user_is_forbidden() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let intruder = repo.seed_user("mallory").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();

        let err = service
            .insert_project(project_req(v1, "偷来的"), intruder.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn update_only_touches_newest_version() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        let v2 = service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();

        let err = service
            .update_project(project_req(v1, "旧版改名"), writer.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotNewestVersion(_)));

        service
            .update_project(project_req(v2, "改名成功"), writer.user_id)
            .await
            .unwrap();
        let head = repo.find_project_by_id(v2).await.unwrap().unwrap();
        assert_eq!(head.title, "改名成功");
    }

    #[tokio::test]
    async fn tags_counted_per_active_version() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let web = repo.seed_project_tag("Web").await;
        let game = repo.seed_project_tag("Game").await;

        let mut req = project_req(-1, "集市");
        req.selected_tags_id = Some(vec![web.tag_id]);
        let v1 = service.insert_project(req, writer.user_id).await.unwrap();
        assert_eq!(
            repo.find_project_tag(web.tag_id).await.unwrap().unwrap().cnt,
            1
        );

        let mut req = project_req(v1, "集市");
        req.selected_tags_id = Some(vec![game.tag_id]);
        service.update_project(req, writer.user_id).await.unwrap();
        assert_eq!(
            repo.find_project_tag(web.tag_id).await.unwrap().unwrap().cnt,
            0
        );
        assert_eq!(
            repo.find_project_tag(game.tag_id).await.unwrap().unwrap().cnt,
            1
        );
    }

    #[tokio::test]
    async fn unknown_tag_rejected() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let mut req = project_req(-1, "集市");
        req.selected_tags_id = Some(vec![9999]);
        let err = service.insert_project(req, writer.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn upgrade_selecting_feedback_bumps_counter() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reviewer = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "建议加搜索".to_string(),
                },
                Some(reviewer.user_id),
            )
            .await
            .unwrap();
        let feedback = &repo.feedbacks_of_project(v1).await.unwrap()[0];

        let mut req = project_req(v1, "集市");
        req.selected_feedbacks_id = Some(vec![feedback.feedback_id]);
        let v2 = service.insert_project(req, writer.user_id).await.unwrap();

        let updated = repo
            .find_feedback_by_id(feedback.feedback_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.selected, 1);
        let selected = repo.selected_feedbacks_of(v2).await.unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].feedback_id, feedback.feedback_id);
    }

    #[tokio::test]
    async fn selected_feedback_rejects_edit_and_delete() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reviewer = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "建议".to_string(),
                },
                Some(reviewer.user_id),
            )
            .await
            .unwrap();
        let feedback_id = repo.feedbacks_of_project(v1).await.unwrap()[0].feedback_id;

        let mut req = project_req(v1, "集市");
        req.selected_feedbacks_id = Some(vec![feedback_id]);
        service.insert_project(req, writer.user_id).await.unwrap();

        let err = service
            .update_feedback(
                FeedbackUpdateReq {
                    feedback_id,
                    content: "改了".to_string(),
                },
                reviewer.user_id,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let err = service
            .delete_feedback(feedback_id, reviewer.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn selecting_feedback_from_other_group_rejected() {
        let (service, repo) = test_service();
        let alice = repo.seed_user("alice").await;
        let carol = repo.seed_user("carol").await;

        let mine = service
            .insert_project(project_req(-1, "我的"), alice.user_id)
            .await
            .unwrap();
        let theirs = service
            .insert_project(project_req(-1, "别人的"), carol.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: theirs,
                    content: "给别人的建议".to_string(),
                },
                Some(alice.user_id),
            )
            .await
            .unwrap();
        let foreign_feedback = repo.feedbacks_of_project(theirs).await.unwrap()[0].feedback_id;

        let mut req = project_req(mine, "我的");
        req.selected_feedbacks_id = Some(vec![foreign_feedback]);
        let err = service.insert_project(req, alice.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_head_reopens_previous_version() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        let v2 = service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();

        service.delete_project(v2, writer.user_id).await.unwrap();

        assert!(repo.find_project_by_id(v2).await.unwrap().is_none());
        let survivor = repo.find_project_by_id(v1).await.unwrap().unwrap();
        assert!(!survivor.closed);
    }

    #[tokio::test]
    async fn delete_requires_newest_version() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();

        let err = service.delete_project(v1, writer.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotNewestVersion(_)));
    }

    #[tokio::test]
    async fn delete_cleans_feedbacks_tags_and_links() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reviewer = repo.seed_user("bob").await;
        let tag = repo.seed_project_tag("Web").await;

        let mut req = project_req(-1, "集市");
        req.selected_tags_id = Some(vec![tag.tag_id]);
        let v1 = service.insert_project(req, writer.user_id).await.unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "建议".to_string(),
                },
                Some(reviewer.user_id),
            )
            .await
            .unwrap();
        let feedback_id = repo.feedbacks_of_project(v1).await.unwrap()[0].feedback_id;
        let code = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        service
            .connect_codes(v1, writer.user_id, vec![code])
            .await
            .unwrap();

        service.delete_project(v1, writer.user_id).await.unwrap();

        assert!(repo.find_feedback_by_id(feedback_id).await.unwrap().is_none());
        assert_eq!(repo.find_project_tag(tag.tag_id).await.unwrap().unwrap().cnt, 0);
        let orphan = repo.find_code_by_id(code).await.unwrap().unwrap();
        assert_eq!(orphan.project_id, None);
    }

    #[tokio::test]
    async fn like_toggle_is_idempotent_pair() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();

        assert_eq!(service.like_project(v1, fan.user_id).await.unwrap(), 1);
        assert_eq!(service.like_project(v1, fan.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn favorite_toggle_counts_all_users() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let bob = repo.seed_user("bob").await;
        let carol = repo.seed_user("carol").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();

        assert_eq!(service.favorite_project(v1, bob.user_id).await.unwrap(), 1);
        assert_eq!(service.favorite_project(v1, carol.user_id).await.unwrap(), 2);
        assert_eq!(service.favorite_project(v1, bob.user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn anonymous_feedback_is_allowed() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        let cnt = service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "路过的建议".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(cnt, 1);
        let feedback = &repo.feedbacks_of_project(v1).await.unwrap()[0];
        assert_eq!(feedback.user_id, None);
        let project = repo.find_project_by_id(v1).await.unwrap().unwrap();
        assert_eq!(project.feedback_cnt, 1);
    }

    #[tokio::test]
    async fn feedback_order_selected_then_mine_then_newest() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let bob = repo.seed_user("bob").await;
        let carol = repo.seed_user("carol").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        for (user, content) in [
            (bob.user_id, "第一条"),
            (carol.user_id, "第二条"),
            (bob.user_id, "第三条"),
        ] {
            service
                .insert_feedback(
                    FeedbackReq {
                        project_id: v1,
                        content: content.to_string(),
                    },
                    Some(user),
                )
                .await
                .unwrap();
        }
        let first_id = repo
            .feedbacks_of_project(v1)
            .await
            .unwrap()
            .iter()
            .find(|f| f.content == "第一条")
            .map(|f| f.feedback_id)
            .unwrap();

        // 升级采纳第一条，此后 bob 查看旧版本详情
        let mut req = project_req(v1, "集市");
        req.selected_feedbacks_id = Some(vec![first_id]);
        service.insert_project(req, writer.user_id).await.unwrap();

        let detail = service.get_project(v1, Some(bob.user_id)).await.unwrap();
        let contents: Vec<&str> = detail.feedbacks.iter().map(|f| f.content.as_str()).collect();
        assert_eq!(contents, vec!["第一条", "第三条", "第二条"]);
    }

    #[tokio::test]
    async fn duplicate_complain_is_conflict() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reader = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "内容不妥".to_string(),
                },
                None,
            )
            .await
            .unwrap();
        let feedback_id = repo.feedbacks_of_project(v1).await.unwrap()[0].feedback_id;

        assert_eq!(
            service
                .complain_feedback(feedback_id, reader.user_id)
                .await
                .unwrap(),
            1
        );
        let err = service
            .complain_feedback(feedback_id, reader.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn check_url_uses_probe_result() {
        let (service, repo) = test_service_with(StubUrlChecker(false), String::new());
        let user = repo.seed_user("alice").await;

        let reachable = service
            .check_project_url("https://dead.example.com", user.user_id)
            .await
            .unwrap();
        assert!(!reachable);
    }

    #[tokio::test]
    async fn thumbnail_renamed_per_version_and_img_updated() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        let url = service
            .update_thumbnail(v1, writer.user_id, "shot.png", vec![1, 2, 3])
            .await
            .unwrap();

        assert!(url.ends_with("alice_1_1.png"));
        let project = repo.find_project_by_id(v1).await.unwrap().unwrap();
        assert_eq!(project.img, url);

        let err = service
            .update_thumbnail(v1, writer.user_id, "shot.png", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn connect_codes_validates_whole_batch_first() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        let code = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();

        let err = service
            .connect_codes(v1, writer.user_id, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = service
            .connect_codes(v1, writer.user_id, vec![code, 9999])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // 整批校验失败时不应该留下半截关联
        let untouched = repo.find_code_by_id(code).await.unwrap().unwrap();
        assert_eq!(untouched.project_id, None);

        assert_eq!(
            service
                .connect_codes(v1, writer.user_id, vec![code])
                .await
                .unwrap(),
            1
        );
        let linked = repo.find_code_by_id(code).await.unwrap().unwrap();
        assert_eq!(linked.project_id, Some(v1));
    }

    #[tokio::test]
    async fn search_filters_keyword_closed_and_sort() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let market = service
            .insert_project(project_req(-1, "代码集市"), writer.user_id)
            .await
            .unwrap();
        let diary = service
            .insert_project(project_req(-1, "日记本"), writer.user_id)
            .await
            .unwrap();
        service.like_project(diary, fan.user_id).await.unwrap();

        let (cards, total) = service
            .get_project_list(search_req(Some("集市"), None, None))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(cards[0].project_id, market);

        let (cards, _) = service
            .get_project_list(search_req(None, Some("likeCnt"), None))
            .await
            .unwrap();
        assert_eq!(cards[0].project_id, diary);

        // 升级后旧版本默认不出现，closed=1 才带出来
        service
            .insert_project(project_req(market, "代码集市"), writer.user_id)
            .await
            .unwrap();
        let (cards, _) = service
            .get_project_list(search_req(Some("集市"), None, None))
            .await
            .unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].version, 2);
        let (cards, _) = service
            .get_project_list(search_req(Some("集市"), None, Some(1)))
            .await
            .unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[tokio::test]
    async fn bad_search_params_rejected() {
        let (service, _repo) = test_service();

        let err = service
            .get_project_list(search_req(None, Some("views"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut search = search_req(None, None, None);
        search.tag_ids = Some("1,x".to_string());
        let err = service.get_project_list(search).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn feedback_list_covers_group_for_writer_only() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let reviewer = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v1,
                    content: "v1的建议".to_string(),
                },
                Some(reviewer.user_id),
            )
            .await
            .unwrap();
        let v2 = service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();
        service
            .insert_feedback(
                FeedbackReq {
                    project_id: v2,
                    content: "v2的建议".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        let entries = service.get_feedback_list(v2, writer.user_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.version == 1));
        assert!(entries.iter().any(|e| e.version == 2));

        let entries = service
            .get_feedback_list(v2, reviewer.user_id)
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn detail_shows_versions_flags_and_connections() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;
        let fan = repo.seed_user("bob").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        let v2 = service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();
        service.like_project(v2, fan.user_id).await.unwrap();
        service.favorite_project(v2, fan.user_id).await.unwrap();
        let code = service
            .insert_code(code_req(-1, "排序"), writer.user_id)
            .await
            .unwrap();
        service
            .connect_codes(v2, writer.user_id, vec![code])
            .await
            .unwrap();

        let detail = service.get_project(v2, Some(fan.user_id)).await.unwrap();
        assert_eq!(detail.user_name, "alice");
        assert!(detail.liked);
        assert!(detail.favorite);
        assert_eq!(detail.versions.len(), 2);
        assert_eq!(detail.versions[0].version, 2);
        assert_eq!(detail.connected_codes.len(), 1);

        let anonymous = service.get_project(v2, None).await.unwrap();
        assert!(!anonymous.liked);
        assert!(!anonymous.favorite);
    }

    #[tokio::test]
    async fn open_flag_follows_version_state() {
        let (service, repo) = test_service();
        let writer = repo.seed_user("alice").await;

        let v1 = service
            .insert_project(project_req(-1, "集市"), writer.user_id)
            .await
            .unwrap();
        assert_eq!(service.is_project_open(v1).await.unwrap(), 1);

        let v2 = service
            .insert_project(project_req(v1, "集市"), writer.user_id)
            .await
            .unwrap();
        assert_eq!(service.is_project_open(v1).await.unwrap(), 0);
        assert_eq!(service.is_project_open(v2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn feedback_on_missing_project_not_found() {
        let (service, repo) = test_service();
        repo.seed_user("alice").await;

        let err = service
            .insert_feedback(
                FeedbackReq {
                    project_id: 404,
                    content: "建议".to_string(),
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
