//! 项目数据库模型
//!
//! 定义项目相关的数据库模型结构体

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// 项目版本行
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub project_id: i64,
    /// 版本组编号，同一个项目的所有版本共享
    pub num: i64,
    pub version: i32,
    pub title: String,
    pub introduction: String,
    /// 缩略图URL，上传前为占位值
    pub img: String,
    pub closed: bool,
    pub like_cnt: i32,
    pub feedback_cnt: i32,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 版本的补充信息，与项目行一对一
#[derive(Debug, Clone, FromRow)]
pub struct ProjectInfo {
    pub project_id: i64,
    pub url: String,
    pub notice: String,
    pub content: String,
}

/// 项目创建参数
///
/// 一次插入 projects 行和对应的 projects_info 行。
#[derive(Debug, Clone)]
pub struct ProjectCreate {
    pub num: i64,
    pub version: i32,
    pub title: String,
    pub introduction: String,
    pub like_cnt: i32,
    pub user_id: i64,
    pub url: String,
    pub notice: String,
    pub content: String,
}

/// 项目更新参数，作用于打开的头部版本
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub title: String,
    pub introduction: String,
    pub url: String,
    pub notice: String,
    pub content: String,
}

/// 项目列表排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortKey {
    /// 按修改时间倒序
    Modified,
    /// 按点赞数倒序
    Likes,
    /// 按反馈数倒序
    Feedbacks,
}

/// 项目搜索参数
#[derive(Debug, Clone)]
pub struct ProjectSearchParams {
    /// 标题/简介关键字，空字符串表示不过滤
    pub keyword: String,
    /// 结果必须带上所有这些标签，空表示不过滤
    pub tag_ids: Vec<i64>,
    /// true 时包含已关闭的历史版本，false 时只返回打开的头部版本
    pub include_closed: bool,
    pub sort: ProjectSortKey,
    pub page_size: i64,
    pub offset: i64,
}

/// 项目搜索结果
#[derive(Debug, Clone)]
pub struct ProjectSearchResult {
    pub projects: Vec<Project>,
    pub total: u32,
}
