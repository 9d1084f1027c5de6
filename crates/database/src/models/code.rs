//! 代码数据库模型
//!
//! 与项目同构的版本组结构，反馈换成了代码评审。

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// 代码版本行
#[derive(Debug, Clone, FromRow)]
pub struct Code {
    pub code_id: i64,
    pub num: i64,
    pub version: i32,
    pub title: String,
    /// 代码片段正文
    pub content: String,
    pub language: String,
    pub closed: bool,
    pub like_cnt: i32,
    pub review_cnt: i32,
    pub user_id: i64,
    /// 关联的项目版本，可为空
    pub project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 代码创建参数
#[derive(Debug, Clone)]
pub struct CodeCreate {
    pub num: i64,
    pub version: i32,
    pub title: String,
    pub content: String,
    pub language: String,
    pub like_cnt: i32,
    pub user_id: i64,
    pub project_id: Option<i64>,
}

/// 代码更新参数，作用于打开的头部版本
#[derive(Debug, Clone)]
pub struct CodeUpdate {
    pub title: String,
    pub content: String,
    pub language: String,
    pub project_id: Option<i64>,
}

/// 代码列表排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSortKey {
    Modified,
    Likes,
    Reviews,
}

/// 代码搜索参数
#[derive(Debug, Clone)]
pub struct CodeSearchParams {
    pub keyword: String,
    pub tag_ids: Vec<i64>,
    pub include_closed: bool,
    pub sort: CodeSortKey,
    pub page_size: i64,
    pub offset: i64,
}

/// 代码搜索结果
#[derive(Debug, Clone)]
pub struct CodeSearchResult {
    pub codes: Vec<Code>,
    pub total: u32,
}
