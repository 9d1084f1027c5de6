//! 标签数据库模型
//!
//! 项目和代码各有一份独立的标签词表，结构相同。

use sqlx::FromRow;

/// 标签词表行，cnt 统计当前使用该标签的版本数
#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
    pub cnt: i32,
}

/// 项目与标签的关联行
#[derive(Debug, Clone, FromRow)]
pub struct SelectedTag {
    pub id: i64,
    pub project_id: i64,
    pub tag_id: i64,
}

/// 代码与标签的关联行
#[derive(Debug, Clone, FromRow)]
pub struct CodeSelectedTag {
    pub id: i64,
    pub code_id: i64,
    pub tag_id: i64,
}
