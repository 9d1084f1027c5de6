//! 标签仓库 trait 定义
//!
//! 项目和代码的标签词表相互独立，接口成对出现。

use crate::models::tag::{CodeSelectedTag, SelectedTag, Tag};
use crate::DatabaseResult;

/// 标签仓库trait定义
///
/// 词表行的 cnt 与关联行数量保持一致，由服务层在增删关联时调整。
#[async_trait::async_trait]
pub trait TagRepositoryTrait: Send + Sync + 'static {
    /// 按关键字搜索项目标签，空关键字返回全部
    async fn search_project_tags(&self, keyword: &str) -> DatabaseResult<Vec<Tag>>;

    /// 根据 ID 查询项目标签
    async fn find_project_tag(&self, tag_id: i64) -> DatabaseResult<Option<Tag>>;

    /// 插入项目与标签的关联行
    async fn insert_project_selected_tag(
        &self,
        project_id: i64,
        tag_id: i64,
    ) -> DatabaseResult<()>;

    /// 查询版本行的全部标签关联
    async fn find_project_selected_tags(
        &self,
        project_id: i64,
    ) -> DatabaseResult<Vec<SelectedTag>>;

    /// 删除版本行的全部标签关联
    async fn delete_project_selected_tags(&self, project_id: i64) -> DatabaseResult<()>;

    /// 调整项目标签的使用计数，返回新值
    async fn update_project_tag_cnt(&self, tag_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 查询版本行携带的标签
    async fn tags_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Tag>>;

    /// 批量查询多个版本行携带的标签，返回 (project_id, 标签) 对
    async fn tags_of_projects(&self, project_ids: &[i64]) -> DatabaseResult<Vec<(i64, Tag)>>;

    /// 按关键字搜索代码标签，空关键字返回全部
    async fn search_code_tags(&self, keyword: &str) -> DatabaseResult<Vec<Tag>>;

    /// 根据 ID 查询代码标签
    async fn find_code_tag(&self, tag_id: i64) -> DatabaseResult<Option<Tag>>;

    /// 插入代码与标签的关联行
    async fn insert_code_selected_tag(&self, code_id: i64, tag_id: i64) -> DatabaseResult<()>;

    /// 查询代码版本行的全部标签关联
    async fn find_code_selected_tags(&self, code_id: i64)
        -> DatabaseResult<Vec<CodeSelectedTag>>;

    /// 删除代码版本行的全部标签关联
    async fn delete_code_selected_tags(&self, code_id: i64) -> DatabaseResult<()>;

    /// 调整代码标签的使用计数，返回新值
    async fn update_code_tag_cnt(&self, tag_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 查询代码版本行携带的标签
    async fn tags_of_code(&self, code_id: i64) -> DatabaseResult<Vec<Tag>>;

    /// 批量查询多个代码版本行携带的标签，返回 (code_id, 标签) 对
    async fn tags_of_codes(&self, code_ids: &[i64]) -> DatabaseResult<Vec<(i64, Tag)>>;
}
