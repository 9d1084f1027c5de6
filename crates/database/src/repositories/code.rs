//! 代码仓库
//!
//! 负责代码版本行、项目关联列、点赞/收藏关联的数据库操作

use crate::models::code::{
    Code, CodeCreate, CodeSearchParams, CodeSearchResult, CodeSortKey, CodeUpdate,
};
use crate::repositories::pg::{CodeSearchRow, PgRepository};
use crate::repositories::traits::CodeRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use tracing::debug;

const CODE_COLUMNS: &str = "code_id, num, version, title, content, language, closed, \
                            like_cnt, review_cnt, user_id, project_id, created_at, modified_at";

#[async_trait::async_trait]
impl CodeRepositoryTrait for PgRepository {
    async fn insert_code(&self, create: CodeCreate) -> DatabaseResult<Code> {
        debug!("📝 创建代码版本: num={}, version={}", create.num, create.version);

        let code = sqlx::query_as::<_, Code>(
            r#"
            INSERT INTO hub.codes (num, version, title, content, language, like_cnt, user_id, project_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING code_id, num, version, title, content, language, closed,
                      like_cnt, review_cnt, user_id, project_id, created_at, modified_at
            "#,
        )
        .bind(create.num)
        .bind(create.version)
        .bind(&create.title)
        .bind(&create.content)
        .bind(&create.language)
        .bind(create.like_cnt)
        .bind(create.user_id)
        .bind(create.project_id)
        .fetch_one(&self.pool)
        .await?;

        debug!("✅ 代码版本创建成功: code_id={}", code.code_id);
        Ok(code)
    }

    async fn find_code_by_id(&self, code_id: i64) -> DatabaseResult<Option<Code>> {
        let code = sqlx::query_as::<_, Code>(&format!(
            "SELECT {CODE_COLUMNS} FROM hub.codes WHERE code_id = $1"
        ))
        .bind(code_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    async fn find_code_versions(&self, num: i64, user_id: i64) -> DatabaseResult<Vec<Code>> {
        let versions = sqlx::query_as::<_, Code>(&format!(
            r#"
            SELECT {CODE_COLUMNS}
            FROM hub.codes
            WHERE num = $1 AND user_id = $2
            ORDER BY version DESC
            "#
        ))
        .bind(num)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(versions)
    }

    async fn latest_code_version(&self, num: i64, user_id: i64) -> DatabaseResult<Option<Code>> {
        let code = sqlx::query_as::<_, Code>(&format!(
            r#"
            SELECT {CODE_COLUMNS}
            FROM hub.codes
            WHERE num = $1 AND user_id = $2
            ORDER BY version DESC
            LIMIT 1
            "#
        ))
        .bind(num)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    async fn close_code_versions(&self, num: i64, user_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE hub.codes SET closed = TRUE WHERE num = $1 AND user_id = $2 AND closed = FALSE",
        )
        .bind(num)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn reopen_code_version(&self, code_id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE hub.codes SET closed = FALSE WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("code {code_id}")));
        }
        Ok(())
    }

    async fn update_code(&self, code_id: i64, update: CodeUpdate) -> DatabaseResult<()> {
        debug!("🔄 更新代码版本: code_id={}", code_id);

        let result = sqlx::query(
            r#"
            UPDATE hub.codes
            SET title       = $2,
                content     = $3,
                language    = $4,
                project_id  = $5,
                modified_at = now()
            WHERE code_id = $1
            "#,
        )
        .bind(code_id)
        .bind(&update.title)
        .bind(&update.content)
        .bind(&update.language)
        .bind(update.project_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("code {code_id}")));
        }
        Ok(())
    }

    async fn update_code_like_cnt(&self, code_id: i64, delta: i32) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            "UPDATE hub.codes SET like_cnt = like_cnt + $2 WHERE code_id = $1 RETURNING like_cnt",
        )
        .bind(code_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn update_code_review_cnt(&self, code_id: i64, delta: i32) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            "UPDATE hub.codes SET review_cnt = review_cnt + $2 WHERE code_id = $1 RETURNING review_cnt",
        )
        .bind(code_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn delete_code(&self, code_id: i64) -> DatabaseResult<()> {
        debug!("🗑️ 删除代码版本: code_id={}", code_id);

        let result = sqlx::query("DELETE FROM hub.codes WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("code {code_id}")));
        }
        Ok(())
    }

    async fn delete_code_likes(&self, code_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.code_likes WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_code_favorites(&self, code_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.code_favorites WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 根据查询参数搜索代码
    ///
    /// 与项目搜索同构：CTE 过滤 + 窗口函数取总数 + CASE 选择排序键。
    /// 关键字只匹配标题。
    async fn search_codes(&self, params: &CodeSearchParams) -> DatabaseResult<CodeSearchResult> {
        debug!(
            "🔍 搜索代码 - 关键字: {:?}, 标签: {:?}, 包含关闭: {}",
            params.keyword, params.tag_ids, params.include_closed
        );

        let like_param = format!("%{}%", params.keyword);
        let sort_token = match params.sort {
            CodeSortKey::Modified => "modified",
            CodeSortKey::Likes => "likes",
            CodeSortKey::Reviews => "reviews",
        };

        let rows = sqlx::query_as::<_, CodeSearchRow>(
            r#"
            WITH filtered AS (
                SELECT c.code_id, c.num, c.version, c.title, c.content, c.language,
                       c.closed, c.like_cnt, c.review_cnt, c.user_id, c.project_id,
                       c.created_at, c.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.codes c
                WHERE ($1 = '' OR c.title ILIKE $2)
                  AND ($3 OR c.closed = FALSE)
                  AND (cardinality($4::BIGINT[]) = 0 OR
                       (SELECT COUNT(*)
                        FROM hub.code_selected_tags st
                        WHERE st.code_id = c.code_id
                          AND st.tag_id = ANY ($4::BIGINT[])) = cardinality($4::BIGINT[]))
            )
            SELECT *
            FROM filtered
            ORDER BY CASE WHEN $5 = 'likes' THEN like_cnt END DESC,
                     CASE WHEN $5 = 'reviews' THEN review_cnt END DESC,
                     modified_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(&params.keyword)
        .bind(&like_param)
        .bind(params.include_closed)
        .bind(&params.tag_ids)
        .bind(sort_token)
        .bind(params.page_size)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = rows.first().map(|r| r.total_count).unwrap_or(0) as u32;
        let codes: Vec<Code> = rows.into_iter().map(|r| r.code).collect();

        debug!("✅ 搜索完成 - 本页 {} 个代码，总计 {} 个", codes.len(), total);
        Ok(CodeSearchResult { codes, total })
    }

    async fn set_code_project(
        &self,
        code_id: i64,
        project_id: Option<i64>,
    ) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE hub.codes SET project_id = $2 WHERE code_id = $1")
            .bind(code_id)
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("code {code_id}")));
        }
        Ok(())
    }

    async fn clear_project_links(&self, project_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query("UPDATE hub.codes SET project_id = NULL WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn codes_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Code>> {
        let codes = sqlx::query_as::<_, Code>(&format!(
            r#"
            SELECT {CODE_COLUMNS}
            FROM hub.codes
            WHERE project_id = $1
            ORDER BY modified_at DESC
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    async fn has_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.code_likes WHERE code_id = $1 AND user_id = $2)",
        )
        .bind(code_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.code_likes (code_id, user_id) VALUES ($1, $2)")
            .bind(code_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_code_like(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.code_likes WHERE code_id = $1 AND user_id = $2")
            .bind(code_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn has_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.code_favorites WHERE code_id = $1 AND user_id = $2)",
        )
        .bind(code_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.code_favorites (code_id, user_id) VALUES ($1, $2)")
            .bind(code_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_code_favorite(&self, code_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.code_favorites WHERE code_id = $1 AND user_id = $2")
            .bind(code_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count_code_favorites(&self, code_id: i64) -> DatabaseResult<i64> {
        let cnt = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM hub.code_favorites WHERE code_id = $1",
        )
        .bind(code_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn liked_code_ids(&self, user_id: i64, code_ids: &[i64]) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT code_id FROM hub.code_likes WHERE user_id = $1 AND code_id = ANY ($2)",
        )
        .bind(user_id)
        .bind(code_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
