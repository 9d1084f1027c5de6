//! 代码评审数据库模型

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// 代码评审行，与项目反馈对应
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub review_id: i64,
    pub code_id: i64,
    pub user_id: Option<i64>,
    pub content: String,
    pub selected: i32,
    pub like_cnt: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 版本与其采纳的评审的关联行
#[derive(Debug, Clone, FromRow)]
pub struct SelectedReview {
    pub id: i64,
    pub code_id: i64,
    pub review_id: i64,
}
