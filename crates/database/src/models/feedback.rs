//! 项目反馈数据库模型

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// 反馈行，挂在收到它的项目版本上
///
/// `user_id` 为 None 表示匿名反馈。
/// `selected` 统计有多少个新版本采纳了这条反馈，大于0时禁止编辑和删除。
#[derive(Debug, Clone, FromRow)]
pub struct Feedback {
    pub feedback_id: i64,
    pub project_id: i64,
    pub user_id: Option<i64>,
    pub content: String,
    pub selected: i32,
    pub like_cnt: i32,
    pub complained: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 版本与其采纳的反馈的关联行
#[derive(Debug, Clone, FromRow)]
pub struct SelectedFeedback {
    pub id: i64,
    /// 采纳反馈的那个新版本
    pub project_id: i64,
    pub feedback_id: i64,
}
