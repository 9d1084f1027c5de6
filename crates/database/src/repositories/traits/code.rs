//! 代码仓库 trait 定义
//!
//! 与项目仓库同构，另外负责维护代码与项目之间的关联列。

use crate::models::code::{Code, CodeCreate, CodeSearchParams, CodeSearchResult, CodeUpdate};
use crate::DatabaseResult;

/// 代码仓库trait定义
#[async_trait::async_trait]
pub trait CodeRepositoryTrait: Send + Sync + 'static {
    /// 插入一个新的代码版本行
    async fn insert_code(&self, create: CodeCreate) -> DatabaseResult<Code>;

    /// 根据 ID 查询代码版本行
    async fn find_code_by_id(&self, code_id: i64) -> DatabaseResult<Option<Code>>;

    /// 查询版本组的全部版本，版本号倒序
    async fn find_code_versions(&self, num: i64, user_id: i64) -> DatabaseResult<Vec<Code>>;

    /// 查询版本组的最新版本
    async fn latest_code_version(&self, num: i64, user_id: i64) -> DatabaseResult<Option<Code>>;

    /// 关闭版本组的全部版本，返回受影响的行数
    async fn close_code_versions(&self, num: i64, user_id: i64) -> DatabaseResult<u64>;

    /// 重新打开指定版本
    async fn reopen_code_version(&self, code_id: i64) -> DatabaseResult<()>;

    /// 更新版本行的标题/正文/语言和项目关联
    async fn update_code(&self, code_id: i64, update: CodeUpdate) -> DatabaseResult<()>;

    /// 调整版本行的点赞计数，返回新值
    async fn update_code_like_cnt(&self, code_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 调整版本行的评审计数，返回新值
    async fn update_code_review_cnt(&self, code_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 删除版本行
    async fn delete_code(&self, code_id: i64) -> DatabaseResult<()>;

    /// 删除版本行的全部点赞关联
    async fn delete_code_likes(&self, code_id: i64) -> DatabaseResult<()>;

    /// 删除版本行的全部收藏关联
    async fn delete_code_favorites(&self, code_id: i64) -> DatabaseResult<()>;

    /// 根据查询参数搜索代码
    async fn search_codes(&self, params: &CodeSearchParams) -> DatabaseResult<CodeSearchResult>;

    /// 设置代码关联的项目版本
    async fn set_code_project(&self, code_id: i64, project_id: Option<i64>) -> DatabaseResult<()>;

    /// 解除指向该项目版本的全部代码关联，返回受影响的行数
    async fn clear_project_links(&self, project_id: i64) -> DatabaseResult<u64>;

    /// 查询关联到该项目版本的代码
    async fn codes_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Code>>;

    /// 用户是否点赞过该版本
    async fn has_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入点赞关联行
    async fn insert_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 删除点赞关联行
    async fn delete_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 用户是否收藏过该版本
    async fn has_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入收藏关联行
    async fn insert_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 删除收藏关联行
    async fn delete_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 统计版本行的收藏数
    async fn count_code_favorites(&self, code_id: i64) -> DatabaseResult<i64>;

    /// 在给定的版本行里筛选出用户点赞过的那些
    async fn liked_code_ids(&self, user_id: i64, code_ids: &[i64]) -> DatabaseResult<Vec<i64>>;
}
