//! 用户数据库模型

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// 用户记录
///
/// `projects_cnt`/`codes_cnt` 记录用户创建过的版本组个数，
/// 新建项目/代码时自增，并作为新版本组的 num 使用。
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub projects_cnt: i64,
    pub codes_cnt: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// 统计卡片用到的用户聚合数据
#[derive(Debug, Clone, Default, FromRow)]
pub struct UserStats {
    /// 用户写过的反馈数
    pub feedback_cnt: i64,
    /// 用户写过的代码评审数
    pub code_review_cnt: i64,
    /// 被采纳的反馈数
    pub included_feedback_cnt: i64,
    /// 被采纳的代码评审数
    pub included_code_review_cnt: i64,
    /// 项目重构次数（版本行数 - 版本组数）
    pub project_refactor_cnt: i64,
    /// 代码重构次数
    pub code_refactor_cnt: i64,
}
