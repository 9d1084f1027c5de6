//! 用户仓库 trait 定义

use crate::models::user::User;
use crate::DatabaseResult;

/// 用户仓库trait定义
///
/// 用户由上游身份系统创建，这里只提供查询和版本组计数器维护。
#[async_trait::async_trait]
pub trait UserRepositoryTrait: Send + Sync + 'static {
    /// 根据 ID 查询用户
    async fn find_user_by_id(&self, user_id: i64) -> DatabaseResult<Option<User>>;

    /// 根据用户名查询用户
    async fn find_user_by_name(&self, name: &str) -> DatabaseResult<Option<User>>;

    /// 项目版本组计数器加一，返回新值
    ///
    /// 新值作为下一个项目版本组的 num 使用。
    async fn bump_user_projects_cnt(&self, user_id: i64) -> DatabaseResult<i64>;

    /// 代码版本组计数器加一，返回新值
    async fn bump_user_codes_cnt(&self, user_id: i64) -> DatabaseResult<i64>;
}
