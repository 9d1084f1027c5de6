//! 代码评审仓库 trait 定义

use crate::models::review::{Review, SelectedReview};
use crate::DatabaseResult;

/// 代码评审仓库trait定义
///
/// 评审没有投诉机制，其余与项目反馈一致。
#[async_trait::async_trait]
pub trait ReviewRepositoryTrait: Send + Sync + 'static {
    /// 插入评审行，user_id 为 None 表示匿名评审
    async fn insert_review(
        &self,
        code_id: i64,
        user_id: Option<i64>,
        content: &str,
    ) -> DatabaseResult<Review>;

    /// 根据 ID 查询评审
    async fn find_review_by_id(&self, review_id: i64) -> DatabaseResult<Option<Review>>;

    /// 更新评审内容
    async fn update_review_content(&self, review_id: i64, content: &str) -> DatabaseResult<()>;

    /// 删除评审行
    async fn delete_review(&self, review_id: i64) -> DatabaseResult<()>;

    /// 删除版本行上的全部评审
    async fn delete_reviews_of_code(&self, code_id: i64) -> DatabaseResult<()>;

    /// 查询版本行收到的评审，新的在前
    async fn reviews_of_code(&self, code_id: i64) -> DatabaseResult<Vec<Review>>;

    /// 调整评审的被采纳计数，返回新值
    async fn update_review_selected(&self, review_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 记录新版本采纳了一条评审
    async fn insert_selected_review(&self, code_id: i64, review_id: i64) -> DatabaseResult<()>;

    /// 查询版本采纳的评审关联行
    async fn find_selected_reviews(&self, code_id: i64) -> DatabaseResult<Vec<SelectedReview>>;

    /// 查询版本采纳的评审行
    async fn selected_reviews_of(&self, code_id: i64) -> DatabaseResult<Vec<Review>>;

    /// 删除版本的全部采纳关联
    async fn delete_selected_reviews(&self, code_id: i64) -> DatabaseResult<()>;

    /// 用户是否点赞过该评审
    async fn has_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入评审点赞关联行
    async fn insert_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 删除评审点赞关联行
    async fn delete_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 调整评审的点赞计数，返回新值
    async fn update_review_like_cnt(&self, review_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 删除评审的全部点赞关联
    async fn delete_review_likes(&self, review_id: i64) -> DatabaseResult<()>;

    /// 在给定的评审里筛选出用户点赞过的那些
    async fn liked_review_ids(
        &self,
        user_id: i64,
        review_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>>;
}
