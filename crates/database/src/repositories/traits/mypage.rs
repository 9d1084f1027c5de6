//! 个人页仓库 trait 定义

use crate::models::code::CodeSearchResult;
use crate::models::project::ProjectSearchResult;
use crate::models::user::UserStats;
use crate::DatabaseResult;

/// 个人页仓库trait定义
///
/// 个人页的列表都按修改时间倒序分页，返回带总数的结果。
#[async_trait::async_trait]
pub trait MypageRepositoryTrait: Send + Sync + 'static {
    /// 用户写过的项目版本
    async fn my_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult>;

    /// 用户收藏的项目版本
    async fn my_favorite_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult>;

    /// 用户反馈过的项目版本
    async fn my_feedback_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult>;

    /// 用户写过的代码版本
    async fn my_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult>;

    /// 用户收藏的代码版本
    async fn my_favorite_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult>;

    /// 用户评审过的代码版本
    async fn my_review_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult>;

    /// 统计卡片用到的聚合数据
    async fn user_stats(&self, user_id: i64) -> DatabaseResult<UserStats>;
}
