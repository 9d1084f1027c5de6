//! PostgreSQL 仓库实例
//!
//! 各聚合的 trait 实现分散在同级的模块文件里。

use crate::models::code::Code;
use crate::models::project::Project;
use sqlx::{FromRow, PgPool};

/// PostgreSQL 仓库
///
/// 持有连接池，实现全部仓库 trait。pool 内部是智能指针，
/// clone 的开销很小。
#[derive(Debug, Clone)]
pub struct PgRepository {
    pub(crate) pool: PgPool,
}

impl PgRepository {
    /// 创建新的仓库实例
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 搜索结果行，带窗口函数算出的总数
#[derive(FromRow)]
pub(crate) struct ProjectSearchRow {
    #[sqlx(flatten)]
    pub(crate) project: Project,
    pub(crate) total_count: i64,
}

#[derive(FromRow)]
pub(crate) struct CodeSearchRow {
    #[sqlx(flatten)]
    pub(crate) code: Code,
    pub(crate) total_count: i64,
}
