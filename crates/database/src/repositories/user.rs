//! 用户仓库

use crate::models::user::User;
use crate::repositories::pg::PgRepository;
use crate::repositories::traits::UserRepositoryTrait;
use crate::DatabaseResult;

#[async_trait::async_trait]
impl UserRepositoryTrait for PgRepository {
    async fn find_user_by_id(&self, user_id: i64) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, projects_cnt, codes_cnt, created_at, modified_at
            FROM hub.users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_name(&self, name: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, projects_cnt, codes_cnt, created_at, modified_at
            FROM hub.users
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn bump_user_projects_cnt(&self, user_id: i64) -> DatabaseResult<i64> {
        let cnt = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE hub.users
            SET projects_cnt = projects_cnt + 1,
                modified_at  = now()
            WHERE user_id = $1
            RETURNING projects_cnt
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn bump_user_codes_cnt(&self, user_id: i64) -> DatabaseResult<i64> {
        let cnt = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE hub.users
            SET codes_cnt   = codes_cnt + 1,
                modified_at = now()
            WHERE user_id = $1
            RETURNING codes_cnt
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }
}
