//! 项目仓库 trait 定义
//!
//! 定义项目数据库操作的抽象接口

use crate::models::project::{
    Project, ProjectCreate, ProjectInfo, ProjectSearchParams, ProjectSearchResult, ProjectUpdate,
};
use crate::DatabaseResult;

/// 项目仓库trait定义
///
/// 定义了项目版本行和关联行的数据库操作接口，支持：
/// - 版本行的创建、查询、更新、删除
/// - 版本组的关闭与重新打开
/// - 搜索（关键字 + 标签 + 分页）
/// - 点赞/收藏关联行维护
///
/// 计数器的加减由服务层按业务顺序逐个调用，库里不做级联。
#[async_trait::async_trait]
pub trait ProjectRepositoryTrait: Send + Sync + 'static {
    /// 插入一个新的项目版本行和对应的补充信息行
    async fn insert_project(&self, create: ProjectCreate) -> DatabaseResult<Project>;

    /// 根据 ID 查询项目版本行
    async fn find_project_by_id(&self, project_id: i64) -> DatabaseResult<Option<Project>>;

    /// 查询版本行的补充信息
    async fn find_project_info(&self, project_id: i64) -> DatabaseResult<Option<ProjectInfo>>;

    /// 查询版本组的全部版本，版本号倒序
    async fn find_project_versions(&self, num: i64, user_id: i64)
        -> DatabaseResult<Vec<Project>>;

    /// 查询版本组的最新版本
    async fn latest_project_version(
        &self,
        num: i64,
        user_id: i64,
    ) -> DatabaseResult<Option<Project>>;

    /// 关闭版本组的全部版本，返回受影响的行数
    ///
    /// 版本升级前调用，新插入的行成为唯一打开的头部版本。
    async fn close_project_versions(&self, num: i64, user_id: i64) -> DatabaseResult<u64>;

    /// 重新打开指定版本
    ///
    /// 头部版本被删除后，组内幸存的最新版本重新打开。
    async fn reopen_project_version(&self, project_id: i64) -> DatabaseResult<()>;

    /// 更新版本行的标题/简介和补充信息
    async fn update_project(&self, project_id: i64, update: ProjectUpdate) -> DatabaseResult<()>;

    /// 更新版本行的缩略图URL
    async fn update_project_img(&self, project_id: i64, img: &str) -> DatabaseResult<()>;

    /// 调整版本行的反馈计数，返回新值
    async fn update_project_feedback_cnt(
        &self,
        project_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32>;

    /// 调整版本行的点赞计数，返回新值
    async fn update_project_like_cnt(&self, project_id: i64, delta: i32) -> DatabaseResult<i32>;

    /// 删除版本行的补充信息
    async fn delete_project_info(&self, project_id: i64) -> DatabaseResult<()>;

    /// 删除版本行
    async fn delete_project(&self, project_id: i64) -> DatabaseResult<()>;

    /// 删除版本行的全部点赞关联
    async fn delete_project_likes(&self, project_id: i64) -> DatabaseResult<()>;

    /// 删除版本行的全部收藏关联
    async fn delete_project_favorites(&self, project_id: i64) -> DatabaseResult<()>;

    /// 根据查询参数搜索项目
    ///
    /// 返回包含项目列表和总数的结果 [`ProjectSearchResult`]
    async fn search_projects(
        &self,
        params: &ProjectSearchParams,
    ) -> DatabaseResult<ProjectSearchResult>;

    /// 用户是否点赞过该版本
    async fn has_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入点赞关联行
    async fn insert_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 删除点赞关联行
    async fn delete_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 用户是否收藏过该版本
    async fn has_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool>;

    /// 插入收藏关联行
    async fn insert_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 删除收藏关联行
    async fn delete_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<()>;

    /// 统计版本行的收藏数
    async fn count_project_favorites(&self, project_id: i64) -> DatabaseResult<i64>;

    /// 在给定的版本行里筛选出用户点赞过的那些
    async fn liked_project_ids(
        &self,
        user_id: i64,
        project_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>>;
}
