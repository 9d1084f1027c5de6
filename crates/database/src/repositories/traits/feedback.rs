//! 项目反馈仓库 trait 定义

use crate::models::feedback::{Feedback, SelectedFeedback};
use crate::DatabaseResult;

/// 项目反馈仓库trait定义
///
/// 覆盖反馈行、采纳关联、点赞和投诉关联的操作。
/// `selected` 计数与采纳关联行保持一致，由服务层调整。
#[async_trait::async_trait]
pub trait FeedbackRepositoryTrait: Send + Sync + 'static {
    /// 插入反馈行，user_id 为 None 表示匿名反馈
    async fn insert_feedback(
        &self,
        project_id: i64,
        user_id: Option<i64>,
        content: &str,
    ) -> DatabaseResult<Feedback>;

    /// 根据 ID 查询反馈
    async fn find_feedback_by_id(&self, feedback_id: i64) -> DatabaseResult<Option<Feedback>>;

    /// 更新反馈内容
    async fn update_feedback_content(&self, feedback_id: i64, content: &str)
        -> DatabaseResult<()>;

    /// 删除反馈行
    async fn delete_feedback(&self, feedback_id: i64) -> DatabaseResult<()>;

    /// 删除版本行上的全部反馈
    async fn delete_feedbacks_of_project(&self, project_id: i64) -> DatabaseResult<()>;

    /// 查询版本行收到的反馈，新的在前
    async fn feedbacks_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Feedback>>;

    /// 批量查询多个版本行收到的反馈
    async fn feedbacks_of_projects(&self, project_ids: &[i64]) -> DatabaseResult<Vec<Feedback>>;

    /// 调整反馈的被采纳计数，返回新值
    async fn update_feedback_selected(&self, feedback_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 记录新版本采纳了一条反馈
    async fn insert_selected_feedback(
        &self,
        project_id: i64,
        feedback_id: i64,
    ) -> DatabaseResult<()>;

    /// 查询版本采纳的反馈关联行
    async fn find_selected_feedbacks(
        &self,
        project_id: i64,
    ) -> DatabaseResult<Vec<SelectedFeedback>>;

    /// 查询版本采纳的反馈行
    async fn selected_feedbacks_of(&self, project_id: i64) -> DatabaseResult<Vec<Feedback>>;

    /// 删除版本的全部采纳关联
    async fn delete_selected_feedbacks(&self, project_id: i64) -> DatabaseResult<()>;

    /// 用户是否点赞过该反馈
    async fn has_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入反馈点赞关联行
    async fn insert_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 删除反馈点赞关联行
    async fn delete_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 调整反馈的点赞计数，返回新值
    async fn update_feedback_like_cnt(&self, feedback_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 删除反馈的全部点赞关联
    async fn delete_feedback_likes(&self, feedback_id: i64) -> DatabaseResult<()>;

    /// 在给定的反馈里筛选出用户点赞过的那些
    async fn liked_feedback_ids(
        &self,
        user_id: i64,
        feedback_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>>;

    /// 用户是否投诉过该反馈
    async fn has_feedback_complain(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入反馈投诉关联行，每人只能投诉一次
    async fn insert_feedback_complain(&self, feedback_id: i64, user_id: i64)
        -> DatabaseResult<()>;

    /// 调整反馈的被投诉计数，返回新值
    async fn update_feedback_complained(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32>;

    /// 删除反馈的全部投诉关联
    async fn delete_feedback_complains(&self, feedback_id: i64) -> DatabaseResult<()>;
}
