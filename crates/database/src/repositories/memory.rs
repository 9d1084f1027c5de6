//! 测试用的内存仓库
//!
//! 用 `RwLock` 保护的内存表实现全部仓库 trait，语义与 PostgreSQL
//! 实现保持一致，服务层和路由层的测试不需要外部数据库。
//! clone 之后共享同一份状态。

use crate::models::code::{
    Code, CodeCreate, CodeSearchParams, CodeSearchResult, CodeSortKey, CodeUpdate,
};
use crate::models::feedback::{Feedback, SelectedFeedback};
use crate::models::project::{
    Project, ProjectCreate, ProjectInfo, ProjectSearchParams, ProjectSearchResult, ProjectSortKey,
    ProjectUpdate,
};
use crate::models::review::{Review, SelectedReview};
use crate::models::tag::{CodeSelectedTag, SelectedTag, Tag};
use crate::models::user::{User, UserStats};
use crate::repositories::traits::{
    CodeRepositoryTrait, FeedbackRepositoryTrait, MypageRepositoryTrait, ProjectRepositoryTrait,
    ReviewRepositoryTrait, TagRepositoryTrait, UserRepositoryTrait,
};
use crate::{DatabaseError, DatabaseResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 通用关联行（点赞/收藏/投诉）
#[derive(Debug, Clone)]
struct JoinRow {
    target_id: i64,
    user_id: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<User>,
    projects: Vec<Project>,
    project_infos: Vec<ProjectInfo>,
    project_tags: Vec<Tag>,
    project_selected_tags: Vec<SelectedTag>,
    feedbacks: Vec<Feedback>,
    selected_feedbacks: Vec<SelectedFeedback>,
    project_likes: Vec<JoinRow>,
    project_favorites: Vec<JoinRow>,
    feedback_likes: Vec<JoinRow>,
    feedback_complains: Vec<JoinRow>,
    codes: Vec<Code>,
    code_tags: Vec<Tag>,
    code_selected_tags: Vec<CodeSelectedTag>,
    code_likes: Vec<JoinRow>,
    code_favorites: Vec<JoinRow>,
    reviews: Vec<Review>,
    selected_reviews: Vec<SelectedReview>,
    review_likes: Vec<JoinRow>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// 内存仓库
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一个用户，用户正常情况下由上游身份系统写入
    pub async fn seed_user(&self, name: &str) -> User {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let user = User {
            user_id: state.next_id(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            projects_cnt: 0,
            codes_cnt: 0,
            created_at: now,
            modified_at: now,
        };
        state.users.push(user.clone());
        user
    }

    /// 预置一个项目标签
    pub async fn seed_project_tag(&self, name: &str) -> Tag {
        let mut state = self.state.write().await;
        let tag = Tag {
            tag_id: state.next_id(),
            name: name.to_string(),
            cnt: 0,
        };
        state.project_tags.push(tag.clone());
        tag
    }

    /// 预置一个代码标签
    pub async fn seed_code_tag(&self, name: &str) -> Tag {
        let mut state = self.state.write().await;
        let tag = Tag {
            tag_id: state.next_id(),
            name: name.to_string(),
            cnt: 0,
        };
        state.code_tags.push(tag.clone());
        tag
    }
}

fn matches_keyword(keyword: &str, haystacks: &[&str]) -> bool {
    if keyword.is_empty() {
        return true;
    }
    let needle = keyword.to_lowercase();
    haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
}

fn project_has_all_tags(state: &MemoryState, project_id: i64, tag_ids: &[i64]) -> bool {
    tag_ids.iter().all(|tag_id| {
        state
            .project_selected_tags
            .iter()
            .any(|st| st.project_id == project_id && st.tag_id == *tag_id)
    })
}

fn code_has_all_tags(state: &MemoryState, code_id: i64, tag_ids: &[i64]) -> bool {
    tag_ids.iter().all(|tag_id| {
        state
            .code_selected_tags
            .iter()
            .any(|st| st.code_id == code_id && st.tag_id == *tag_id)
    })
}

fn page<T: Clone>(rows: Vec<T>, page_size: i64, offset: i64) -> (Vec<T>, u32) {
    let total = rows.len() as u32;
    let paged = rows
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(page_size.max(0) as usize)
        .collect();
    (paged, total)
}

#[async_trait::async_trait]
impl UserRepositoryTrait for MemoryRepository {
    async fn find_user_by_id(&self, user_id: i64) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.name == name).cloned())
    }

    async fn bump_user_projects_cnt(&self, user_id: i64) -> DatabaseResult<i64> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| DatabaseError::not_found(format!("user {user_id}")))?;
        user.projects_cnt += 1;
        user.modified_at = Utc::now();
        Ok(user.projects_cnt)
    }

    async fn bump_user_codes_cnt(&self, user_id: i64) -> DatabaseResult<i64> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| DatabaseError::not_found(format!("user {user_id}")))?;
        user.codes_cnt += 1;
        user.modified_at = Utc::now();
        Ok(user.codes_cnt)
    }
}

#[async_trait::async_trait]
impl ProjectRepositoryTrait for MemoryRepository {
    async fn insert_project(&self, create: ProjectCreate) -> DatabaseResult<Project> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let project = Project {
            project_id: state.next_id(),
            num: create.num,
            version: create.version,
            title: create.title,
            introduction: create.introduction,
            img: "temp".to_string(),
            closed: false,
            like_cnt: create.like_cnt,
            feedback_cnt: 0,
            user_id: create.user_id,
            created_at: now,
            modified_at: now,
        };
        state.projects.push(project.clone());
        state.project_infos.push(ProjectInfo {
            project_id: project.project_id,
            url: create.url,
            notice: create.notice,
            content: create.content,
        });
        Ok(project)
    }

    async fn find_project_by_id(&self, project_id: i64) -> DatabaseResult<Option<Project>> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned())
    }

    async fn find_project_info(&self, project_id: i64) -> DatabaseResult<Option<ProjectInfo>> {
        let state = self.state.read().await;
        Ok(state
            .project_infos
            .iter()
            .find(|i| i.project_id == project_id)
            .cloned())
    }

    async fn find_project_versions(
        &self,
        num: i64,
        user_id: i64,
    ) -> DatabaseResult<Vec<Project>> {
        let state = self.state.read().await;
        let mut versions: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| p.num == num && p.user_id == user_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn latest_project_version(
        &self,
        num: i64,
        user_id: i64,
    ) -> DatabaseResult<Option<Project>> {
        Ok(self.find_project_versions(num, user_id).await?.into_iter().next())
    }

    async fn close_project_versions(&self, num: i64, user_id: i64) -> DatabaseResult<u64> {
        let mut state = self.state.write().await;
        let mut affected = 0;
        for project in state
            .projects
            .iter_mut()
            .filter(|p| p.num == num && p.user_id == user_id && !p.closed)
        {
            project.closed = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn reopen_project_version(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {project_id}")))?;
        project.closed = false;
        Ok(())
    }

    async fn update_project(&self, project_id: i64, update: ProjectUpdate) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {project_id}")))?;
        project.title = update.title;
        project.introduction = update.introduction;
        project.modified_at = Utc::now();
        if let Some(info) = state
            .project_infos
            .iter_mut()
            .find(|i| i.project_id == project_id)
        {
            info.url = update.url;
            info.notice = update.notice;
            info.content = update.content;
        }
        Ok(())
    }

    async fn update_project_img(&self, project_id: i64, img: &str) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {project_id}")))?;
        project.img = img.to_string();
        project.modified_at = Utc::now();
        Ok(())
    }

    async fn update_project_feedback_cnt(
        &self,
        project_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {project_id}")))?;
        project.feedback_cnt += delta;
        Ok(project.feedback_cnt)
    }

    async fn update_project_like_cnt(&self, project_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .ok_or_else(|| DatabaseError::not_found(format!("project {project_id}")))?;
        project.like_cnt += delta;
        Ok(project.like_cnt)
    }

    async fn delete_project_info(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.project_infos.retain(|i| i.project_id != project_id);
        Ok(())
    }

    async fn delete_project(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let before = state.projects.len();
        state.projects.retain(|p| p.project_id != project_id);
        if state.projects.len() == before {
            return Err(DatabaseError::not_found(format!("project {project_id}")));
        }
        Ok(())
    }

    async fn delete_project_likes(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.project_likes.retain(|l| l.target_id != project_id);
        Ok(())
    }

    async fn delete_project_favorites(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.project_favorites.retain(|f| f.target_id != project_id);
        Ok(())
    }

    async fn search_projects(
        &self,
        params: &ProjectSearchParams,
    ) -> DatabaseResult<ProjectSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| matches_keyword(&params.keyword, &[&p.title, &p.introduction]))
            .filter(|p| params.include_closed || !p.closed)
            .filter(|p| project_has_all_tags(&state, p.project_id, &params.tag_ids))
            .cloned()
            .collect();
        rows.sort_by(|a, b| match params.sort {
            ProjectSortKey::Modified => b.modified_at.cmp(&a.modified_at),
            ProjectSortKey::Likes => b
                .like_cnt
                .cmp(&a.like_cnt)
                .then(b.modified_at.cmp(&a.modified_at)),
            ProjectSortKey::Feedbacks => b
                .feedback_cnt
                .cmp(&a.feedback_cnt)
                .then(b.modified_at.cmp(&a.modified_at)),
        });
        let (projects, total) = page(rows, params.page_size, params.offset);
        Ok(ProjectSearchResult { projects, total })
    }

    async fn has_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .project_likes
            .iter()
            .any(|l| l.target_id == project_id && l.user_id == user_id))
    }

    async fn insert_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .project_likes
            .iter()
            .any(|l| l.target_id == project_id && l.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "project_like ({project_id}, {user_id})"
            )));
        }
        state.project_likes.push(JoinRow {
            target_id: project_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .project_likes
            .retain(|l| !(l.target_id == project_id && l.user_id == user_id));
        Ok(())
    }

    async fn has_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .project_favorites
            .iter()
            .any(|f| f.target_id == project_id && f.user_id == user_id))
    }

    async fn insert_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .project_favorites
            .iter()
            .any(|f| f.target_id == project_id && f.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "project_favorite ({project_id}, {user_id})"
            )));
        }
        state.project_favorites.push(JoinRow {
            target_id: project_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .project_favorites
            .retain(|f| !(f.target_id == project_id && f.user_id == user_id));
        Ok(())
    }

    async fn count_project_favorites(&self, project_id: i64) -> DatabaseResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .project_favorites
            .iter()
            .filter(|f| f.target_id == project_id)
            .count() as i64)
    }

    async fn liked_project_ids(
        &self,
        user_id: i64,
        project_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .project_likes
            .iter()
            .filter(|l| l.user_id == user_id && project_ids.contains(&l.target_id))
            .map(|l| l.target_id)
            .collect())
    }
}

#[async_trait::async_trait]
impl TagRepositoryTrait for MemoryRepository {
    async fn search_project_tags(&self, keyword: &str) -> DatabaseResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .project_tags
            .iter()
            .filter(|t| matches_keyword(keyword, &[&t.name]))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_project_tag(&self, tag_id: i64) -> DatabaseResult<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state.project_tags.iter().find(|t| t.tag_id == tag_id).cloned())
    }

    async fn insert_project_selected_tag(
        &self,
        project_id: i64,
        tag_id: i64,
    ) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.project_selected_tags.push(SelectedTag {
            id,
            project_id,
            tag_id,
        });
        Ok(())
    }

    async fn find_project_selected_tags(
        &self,
        project_id: i64,
    ) -> DatabaseResult<Vec<SelectedTag>> {
        let state = self.state.read().await;
        Ok(state
            .project_selected_tags
            .iter()
            .filter(|st| st.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn delete_project_selected_tags(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .project_selected_tags
            .retain(|st| st.project_id != project_id);
        Ok(())
    }

    async fn update_project_tag_cnt(&self, tag_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let tag = state
            .project_tags
            .iter_mut()
            .find(|t| t.tag_id == tag_id)
            .ok_or_else(|| DatabaseError::not_found(format!("project tag {tag_id}")))?;
        tag.cnt += delta;
        Ok(tag.cnt)
    }

    async fn tags_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .project_selected_tags
            .iter()
            .filter(|st| st.project_id == project_id)
            .filter_map(|st| state.project_tags.iter().find(|t| t.tag_id == st.tag_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn tags_of_projects(&self, project_ids: &[i64]) -> DatabaseResult<Vec<(i64, Tag)>> {
        let state = self.state.read().await;
        let mut pairs: Vec<(i64, Tag)> = state
            .project_selected_tags
            .iter()
            .filter(|st| project_ids.contains(&st.project_id))
            .filter_map(|st| {
                state
                    .project_tags
                    .iter()
                    .find(|t| t.tag_id == st.tag_id)
                    .map(|t| (st.project_id, t.clone()))
            })
            .collect();
        pairs.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(pairs)
    }

    async fn search_code_tags(&self, keyword: &str) -> DatabaseResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .code_tags
            .iter()
            .filter(|t| matches_keyword(keyword, &[&t.name]))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_code_tag(&self, tag_id: i64) -> DatabaseResult<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state.code_tags.iter().find(|t| t.tag_id == tag_id).cloned())
    }

    async fn insert_code_selected_tag(&self, code_id: i64, tag_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.code_selected_tags.push(CodeSelectedTag {
            id,
            code_id,
            tag_id,
        });
        Ok(())
    }

    async fn find_code_selected_tags(
        &self,
        code_id: i64,
    ) -> DatabaseResult<Vec<CodeSelectedTag>> {
        let state = self.state.read().await;
        Ok(state
            .code_selected_tags
            .iter()
            .filter(|st| st.code_id == code_id)
            .cloned()
            .collect())
    }

    async fn delete_code_selected_tags(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.code_selected_tags.retain(|st| st.code_id != code_id);
        Ok(())
    }

    async fn update_code_tag_cnt(&self, tag_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let tag = state
            .code_tags
            .iter_mut()
            .find(|t| t.tag_id == tag_id)
            .ok_or_else(|| DatabaseError::not_found(format!("code tag {tag_id}")))?;
        tag.cnt += delta;
        Ok(tag.cnt)
    }

    async fn tags_of_code(&self, code_id: i64) -> DatabaseResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .code_selected_tags
            .iter()
            .filter(|st| st.code_id == code_id)
            .filter_map(|st| state.code_tags.iter().find(|t| t.tag_id == st.tag_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn tags_of_codes(&self, code_ids: &[i64]) -> DatabaseResult<Vec<(i64, Tag)>> {
        let state = self.state.read().await;
        let mut pairs: Vec<(i64, Tag)> = state
            .code_selected_tags
            .iter()
            .filter(|st| code_ids.contains(&st.code_id))
            .filter_map(|st| {
                state
                    .code_tags
                    .iter()
                    .find(|t| t.tag_id == st.tag_id)
                    .map(|t| (st.code_id, t.clone()))
            })
            .collect();
        pairs.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        Ok(pairs)
    }
}

#[async_trait::async_trait]
impl FeedbackRepositoryTrait for MemoryRepository {
    async fn insert_feedback(
        &self,
        project_id: i64,
        user_id: Option<i64>,
        content: &str,
    ) -> DatabaseResult<Feedback> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let feedback = Feedback {
            feedback_id: state.next_id(),
            project_id,
            user_id,
            content: content.to_string(),
            selected: 0,
            like_cnt: 0,
            complained: 0,
            created_at: now,
            modified_at: now,
        };
        state.feedbacks.push(feedback.clone());
        Ok(feedback)
    }

    async fn find_feedback_by_id(&self, feedback_id: i64) -> DatabaseResult<Option<Feedback>> {
        let state = self.state.read().await;
        Ok(state
            .feedbacks
            .iter()
            .find(|f| f.feedback_id == feedback_id)
            .cloned())
    }

    async fn update_feedback_content(
        &self,
        feedback_id: i64,
        content: &str,
    ) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let feedback = state
            .feedbacks
            .iter_mut()
            .find(|f| f.feedback_id == feedback_id)
            .ok_or_else(|| DatabaseError::not_found(format!("feedback {feedback_id}")))?;
        feedback.content = content.to_string();
        feedback.modified_at = Utc::now();
        Ok(())
    }

    async fn delete_feedback(&self, feedback_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let before = state.feedbacks.len();
        state.feedbacks.retain(|f| f.feedback_id != feedback_id);
        if state.feedbacks.len() == before {
            return Err(DatabaseError::not_found(format!("feedback {feedback_id}")));
        }
        Ok(())
    }

    async fn delete_feedbacks_of_project(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.feedbacks.retain(|f| f.project_id != project_id);
        Ok(())
    }

    async fn feedbacks_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Feedback>> {
        let state = self.state.read().await;
        let mut feedbacks: Vec<Feedback> = state
            .feedbacks
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect();
        feedbacks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.feedback_id.cmp(&a.feedback_id))
        });
        Ok(feedbacks)
    }

    async fn feedbacks_of_projects(&self, project_ids: &[i64]) -> DatabaseResult<Vec<Feedback>> {
        let state = self.state.read().await;
        let mut feedbacks: Vec<Feedback> = state
            .feedbacks
            .iter()
            .filter(|f| project_ids.contains(&f.project_id))
            .cloned()
            .collect();
        feedbacks.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.feedback_id.cmp(&a.feedback_id))
        });
        Ok(feedbacks)
    }

    async fn update_feedback_selected(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let feedback = state
            .feedbacks
            .iter_mut()
            .find(|f| f.feedback_id == feedback_id)
            .ok_or_else(|| DatabaseError::not_found(format!("feedback {feedback_id}")))?;
        feedback.selected += delta;
        Ok(feedback.selected)
    }

    async fn insert_selected_feedback(
        &self,
        project_id: i64,
        feedback_id: i64,
    ) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.selected_feedbacks.push(SelectedFeedback {
            id,
            project_id,
            feedback_id,
        });
        Ok(())
    }

    async fn find_selected_feedbacks(
        &self,
        project_id: i64,
    ) -> DatabaseResult<Vec<SelectedFeedback>> {
        let state = self.state.read().await;
        Ok(state
            .selected_feedbacks
            .iter()
            .filter(|sf| sf.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn selected_feedbacks_of(&self, project_id: i64) -> DatabaseResult<Vec<Feedback>> {
        let state = self.state.read().await;
        let mut feedbacks: Vec<Feedback> = state
            .selected_feedbacks
            .iter()
            .filter(|sf| sf.project_id == project_id)
            .filter_map(|sf| {
                state
                    .feedbacks
                    .iter()
                    .find(|f| f.feedback_id == sf.feedback_id)
            })
            .cloned()
            .collect();
        feedbacks.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.feedback_id.cmp(&b.feedback_id))
        });
        Ok(feedbacks)
    }

    async fn delete_selected_feedbacks(&self, project_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .selected_feedbacks
            .retain(|sf| sf.project_id != project_id);
        Ok(())
    }

    async fn has_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .feedback_likes
            .iter()
            .any(|l| l.target_id == feedback_id && l.user_id == user_id))
    }

    async fn insert_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .feedback_likes
            .iter()
            .any(|l| l.target_id == feedback_id && l.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "feedback_like ({feedback_id}, {user_id})"
            )));
        }
        state.feedback_likes.push(JoinRow {
            target_id: feedback_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .feedback_likes
            .retain(|l| !(l.target_id == feedback_id && l.user_id == user_id));
        Ok(())
    }

    async fn update_feedback_like_cnt(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let feedback = state
            .feedbacks
            .iter_mut()
            .find(|f| f.feedback_id == feedback_id)
            .ok_or_else(|| DatabaseError::not_found(format!("feedback {feedback_id}")))?;
        feedback.like_cnt += delta;
        Ok(feedback.like_cnt)
    }

    async fn delete_feedback_likes(&self, feedback_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.feedback_likes.retain(|l| l.target_id != feedback_id);
        Ok(())
    }

    async fn liked_feedback_ids(
        &self,
        user_id: i64,
        feedback_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .feedback_likes
            .iter()
            .filter(|l| l.user_id == user_id && feedback_ids.contains(&l.target_id))
            .map(|l| l.target_id)
            .collect())
    }

    async fn has_feedback_complain(
        &self,
        feedback_id: i64,
        user_id: i64,
    ) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .feedback_complains
            .iter()
            .any(|c| c.target_id == feedback_id && c.user_id == user_id))
    }

    async fn insert_feedback_complain(
        &self,
        feedback_id: i64,
        user_id: i64,
    ) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .feedback_complains
            .iter()
            .any(|c| c.target_id == feedback_id && c.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "feedback_complain ({feedback_id}, {user_id})"
            )));
        }
        state.feedback_complains.push(JoinRow {
            target_id: feedback_id,
            user_id,
        });
        Ok(())
    }

    async fn update_feedback_complained(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let feedback = state
            .feedbacks
            .iter_mut()
            .find(|f| f.feedback_id == feedback_id)
            .ok_or_else(|| DatabaseError::not_found(format!("feedback {feedback_id}")))?;
        feedback.complained += delta;
        Ok(feedback.complained)
    }

    async fn delete_feedback_complains(&self, feedback_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .feedback_complains
            .retain(|c| c.target_id != feedback_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CodeRepositoryTrait for MemoryRepository {
    async fn insert_code(&self, create: CodeCreate) -> DatabaseResult<Code> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let code = Code {
            code_id: state.next_id(),
            num: create.num,
            version: create.version,
            title: create.title,
            content: create.content,
            language: create.language,
            closed: false,
            like_cnt: create.like_cnt,
            review_cnt: 0,
            user_id: create.user_id,
            project_id: create.project_id,
            created_at: now,
            modified_at: now,
        };
        state.codes.push(code.clone());
        Ok(code)
    }

    async fn find_code_by_id(&self, code_id: i64) -> DatabaseResult<Option<Code>> {
        let state = self.state.read().await;
        Ok(state.codes.iter().find(|c| c.code_id == code_id).cloned())
    }

    async fn find_code_versions(&self, num: i64, user_id: i64) -> DatabaseResult<Vec<Code>> {
        let state = self.state.read().await;
        let mut versions: Vec<Code> = state
            .codes
            .iter()
            .filter(|c| c.num == num && c.user_id == user_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn latest_code_version(&self, num: i64, user_id: i64) -> DatabaseResult<Option<Code>> {
        Ok(self.find_code_versions(num, user_id).await?.into_iter().next())
    }

    async fn close_code_versions(&self, num: i64, user_id: i64) -> DatabaseResult<u64> {
        let mut state = self.state.write().await;
        let mut affected = 0;
        for code in state
            .codes
            .iter_mut()
            .filter(|c| c.num == num && c.user_id == user_id && !c.closed)
        {
            code.closed = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn reopen_code_version(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let code = state
            .codes
            .iter_mut()
            .find(|c| c.code_id == code_id)
            .ok_or_else(|| DatabaseError::not_found(format!("code {code_id}")))?;
        code.closed = false;
        Ok(())
    }

    async fn update_code(&self, code_id: i64, update: CodeUpdate) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let code = state
            .codes
            .iter_mut()
            .find(|c| c.code_id == code_id)
            .ok_or_else(|| DatabaseError::not_found(format!("code {code_id}")))?;
        code.title = update.title;
        code.content = update.content;
        code.language = update.language;
        code.project_id = update.project_id;
        code.modified_at = Utc::now();
        Ok(())
    }

    async fn update_code_like_cnt(&self, code_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let code = state
            .codes
            .iter_mut()
            .find(|c| c.code_id == code_id)
            .ok_or_else(|| DatabaseError::not_found(format!("code {code_id}")))?;
        code.like_cnt += delta;
        Ok(code.like_cnt)
    }

    async fn update_code_review_cnt(&self, code_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let code = state
            .codes
            .iter_mut()
            .find(|c| c.code_id == code_id)
            .ok_or_else(|| DatabaseError::not_found(format!("code {code_id}")))?;
        code.review_cnt += delta;
        Ok(code.review_cnt)
    }

    async fn delete_code(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let before = state.codes.len();
        state.codes.retain(|c| c.code_id != code_id);
        if state.codes.len() == before {
            return Err(DatabaseError::not_found(format!("code {code_id}")));
        }
        Ok(())
    }

    async fn delete_code_likes(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.code_likes.retain(|l| l.target_id != code_id);
        Ok(())
    }

    async fn delete_code_favorites(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.code_favorites.retain(|f| f.target_id != code_id);
        Ok(())
    }

    async fn search_codes(&self, params: &CodeSearchParams) -> DatabaseResult<CodeSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Code> = state
            .codes
            .iter()
            .filter(|c| matches_keyword(&params.keyword, &[&c.title]))
            .filter(|c| params.include_closed || !c.closed)
            .filter(|c| code_has_all_tags(&state, c.code_id, &params.tag_ids))
            .cloned()
            .collect();
        rows.sort_by(|a, b| match params.sort {
            CodeSortKey::Modified => b.modified_at.cmp(&a.modified_at),
            CodeSortKey::Likes => b
                .like_cnt
                .cmp(&a.like_cnt)
                .then(b.modified_at.cmp(&a.modified_at)),
            CodeSortKey::Reviews => b
                .review_cnt
                .cmp(&a.review_cnt)
                .then(b.modified_at.cmp(&a.modified_at)),
        });
        let (codes, total) = page(rows, params.page_size, params.offset);
        Ok(CodeSearchResult { codes, total })
    }

    async fn set_code_project(
        &self,
        code_id: i64,
        project_id: Option<i64>,
    ) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let code = state
            .codes
            .iter_mut()
            .find(|c| c.code_id == code_id)
            .ok_or_else(|| DatabaseError::not_found(format!("code {code_id}")))?;
        code.project_id = project_id;
        Ok(())
    }

    async fn clear_project_links(&self, project_id: i64) -> DatabaseResult<u64> {
        let mut state = self.state.write().await;
        let mut affected = 0;
        for code in state
            .codes
            .iter_mut()
            .filter(|c| c.project_id == Some(project_id))
        {
            code.project_id = None;
            affected += 1;
        }
        Ok(affected)
    }

    async fn codes_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Code>> {
        let state = self.state.read().await;
        let mut codes: Vec<Code> = state
            .codes
            .iter()
            .filter(|c| c.project_id == Some(project_id))
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        Ok(codes)
    }

    async fn has_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .code_likes
            .iter()
            .any(|l| l.target_id == code_id && l.user_id == user_id))
    }

    async fn insert_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .code_likes
            .iter()
            .any(|l| l.target_id == code_id && l.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "code_like ({code_id}, {user_id})"
            )));
        }
        state.code_likes.push(JoinRow {
            target_id: code_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .code_likes
            .retain(|l| !(l.target_id == code_id && l.user_id == user_id));
        Ok(())
    }

    async fn has_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .code_favorites
            .iter()
            .any(|f| f.target_id == code_id && f.user_id == user_id))
    }

    async fn insert_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .code_favorites
            .iter()
            .any(|f| f.target_id == code_id && f.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "code_favorite ({code_id}, {user_id})"
            )));
        }
        state.code_favorites.push(JoinRow {
            target_id: code_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .code_favorites
            .retain(|f| !(f.target_id == code_id && f.user_id == user_id));
        Ok(())
    }

    async fn count_code_favorites(&self, code_id: i64) -> DatabaseResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .code_favorites
            .iter()
            .filter(|f| f.target_id == code_id)
            .count() as i64)
    }

    async fn liked_code_ids(&self, user_id: i64, code_ids: &[i64]) -> DatabaseResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .code_likes
            .iter()
            .filter(|l| l.user_id == user_id && code_ids.contains(&l.target_id))
            .map(|l| l.target_id)
            .collect())
    }
}

#[async_trait::async_trait]
impl ReviewRepositoryTrait for MemoryRepository {
    async fn insert_review(
        &self,
        code_id: i64,
        user_id: Option<i64>,
        content: &str,
    ) -> DatabaseResult<Review> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let review = Review {
            review_id: state.next_id(),
            code_id,
            user_id,
            content: content.to_string(),
            selected: 0,
            like_cnt: 0,
            created_at: now,
            modified_at: now,
        };
        state.reviews.push(review.clone());
        Ok(review)
    }

    async fn find_review_by_id(&self, review_id: i64) -> DatabaseResult<Option<Review>> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .iter()
            .find(|r| r.review_id == review_id)
            .cloned())
    }

    async fn update_review_content(&self, review_id: i64, content: &str) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.review_id == review_id)
            .ok_or_else(|| DatabaseError::not_found(format!("review {review_id}")))?;
        review.content = content.to_string();
        review.modified_at = Utc::now();
        Ok(())
    }

    async fn delete_review(&self, review_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let before = state.reviews.len();
        state.reviews.retain(|r| r.review_id != review_id);
        if state.reviews.len() == before {
            return Err(DatabaseError::not_found(format!("review {review_id}")));
        }
        Ok(())
    }

    async fn delete_reviews_of_code(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.reviews.retain(|r| r.code_id != code_id);
        Ok(())
    }

    async fn reviews_of_code(&self, code_id: i64) -> DatabaseResult<Vec<Review>> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.code_id == code_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.review_id.cmp(&a.review_id))
        });
        Ok(reviews)
    }

    async fn update_review_selected(&self, review_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.review_id == review_id)
            .ok_or_else(|| DatabaseError::not_found(format!("review {review_id}")))?;
        review.selected += delta;
        Ok(review.selected)
    }

    async fn insert_selected_review(&self, code_id: i64, review_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.selected_reviews.push(SelectedReview {
            id,
            code_id,
            review_id,
        });
        Ok(())
    }

    async fn find_selected_reviews(&self, code_id: i64) -> DatabaseResult<Vec<SelectedReview>> {
        let state = self.state.read().await;
        Ok(state
            .selected_reviews
            .iter()
            .filter(|sr| sr.code_id == code_id)
            .cloned()
            .collect())
    }

    async fn selected_reviews_of(&self, code_id: i64) -> DatabaseResult<Vec<Review>> {
        let state = self.state.read().await;
        let mut reviews: Vec<Review> = state
            .selected_reviews
            .iter()
            .filter(|sr| sr.code_id == code_id)
            .filter_map(|sr| state.reviews.iter().find(|r| r.review_id == sr.review_id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.review_id.cmp(&b.review_id))
        });
        Ok(reviews)
    }

    async fn delete_selected_reviews(&self, code_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.selected_reviews.retain(|sr| sr.code_id != code_id);
        Ok(())
    }

    async fn has_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .review_likes
            .iter()
            .any(|l| l.target_id == review_id && l.user_id == user_id))
    }

    async fn insert_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        if state
            .review_likes
            .iter()
            .any(|l| l.target_id == review_id && l.user_id == user_id)
        {
            return Err(DatabaseError::conflict(format!(
                "review_like ({review_id}, {user_id})"
            )));
        }
        state.review_likes.push(JoinRow {
            target_id: review_id,
            user_id,
        });
        Ok(())
    }

    async fn delete_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state
            .review_likes
            .retain(|l| !(l.target_id == review_id && l.user_id == user_id));
        Ok(())
    }

    async fn update_review_like_cnt(&self, review_id: i64, delta: i32) -> DatabaseResult<i32> {
        let mut state = self.state.write().await;
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.review_id == review_id)
            .ok_or_else(|| DatabaseError::not_found(format!("review {review_id}")))?;
        review.like_cnt += delta;
        Ok(review.like_cnt)
    }

    async fn delete_review_likes(&self, review_id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.review_likes.retain(|l| l.target_id != review_id);
        Ok(())
    }

    async fn liked_review_ids(
        &self,
        user_id: i64,
        review_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>> {
        let state = self.state.read().await;
        Ok(state
            .review_likes
            .iter()
            .filter(|l| l.user_id == user_id && review_ids.contains(&l.target_id))
            .map(|l| l.target_id)
            .collect())
    }
}

#[async_trait::async_trait]
impl MypageRepositoryTrait for MemoryRepository {
    async fn my_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(b.project_id.cmp(&a.project_id)));
        let (projects, total) = page(rows, page_size, offset);
        Ok(ProjectSearchResult { projects, total })
    }

    async fn my_favorite_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| {
                state
                    .project_favorites
                    .iter()
                    .any(|f| f.target_id == p.project_id && f.user_id == user_id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(b.project_id.cmp(&a.project_id)));
        let (projects, total) = page(rows, page_size, offset);
        Ok(ProjectSearchResult { projects, total })
    }

    async fn my_feedback_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| {
                state
                    .feedbacks
                    .iter()
                    .any(|f| f.project_id == p.project_id && f.user_id == Some(user_id))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(b.project_id.cmp(&a.project_id)));
        let (projects, total) = page(rows, page_size, offset);
        Ok(ProjectSearchResult { projects, total })
    }

    async fn my_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Code> = state
            .codes
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(b.code_id.cmp(&a.code_id)));
        let (codes, total) = page(rows, page_size, offset);
        Ok(CodeSearchResult { codes, total })
    }

    async fn my_favorite_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Code> = state
            .codes
            .iter()
            .filter(|c| {
                state
                    .code_favorites
                    .iter()
                    .any(|f| f.target_id == c.code_id && f.user_id == user_id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(b.code_id.cmp(&a.code_id)));
        let (codes, total) = page(rows, page_size, offset);
        Ok(CodeSearchResult { codes, total })
    }

    async fn my_review_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult> {
        let state = self.state.read().await;
        let mut rows: Vec<Code> = state
            .codes
            .iter()
            .filter(|c| {
                state
                    .reviews
                    .iter()
                    .any(|r| r.code_id == c.code_id && r.user_id == Some(user_id))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(b.code_id.cmp(&a.code_id)));
        let (codes, total) = page(rows, page_size, offset);
        Ok(CodeSearchResult { codes, total })
    }

    async fn user_stats(&self, user_id: i64) -> DatabaseResult<UserStats> {
        let state = self.state.read().await;
        let feedback_cnt = state
            .feedbacks
            .iter()
            .filter(|f| f.user_id == Some(user_id))
            .count() as i64;
        let code_review_cnt = state
            .reviews
            .iter()
            .filter(|r| r.user_id == Some(user_id))
            .count() as i64;
        let included_feedback_cnt = state
            .feedbacks
            .iter()
            .filter(|f| f.user_id == Some(user_id) && f.selected > 0)
            .count() as i64;
        let included_code_review_cnt = state
            .reviews
            .iter()
            .filter(|r| r.user_id == Some(user_id) && r.selected > 0)
            .count() as i64;

        let my_projects: Vec<&Project> = state
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .collect();
        let mut project_nums: Vec<i64> = my_projects.iter().map(|p| p.num).collect();
        project_nums.sort_unstable();
        project_nums.dedup();
        let project_refactor_cnt = my_projects.len() as i64 - project_nums.len() as i64;

        let my_codes: Vec<&Code> = state.codes.iter().filter(|c| c.user_id == user_id).collect();
        let mut code_nums: Vec<i64> = my_codes.iter().map(|c| c.num).collect();
        code_nums.sort_unstable();
        code_nums.dedup();
        let code_refactor_cnt = my_codes.len() as i64 - code_nums.len() as i64;

        Ok(UserStats {
            feedback_cnt,
            code_review_cnt,
            included_feedback_cnt,
            included_code_review_cnt,
            project_refactor_cnt,
            code_refactor_cnt,
        })
    }
}
