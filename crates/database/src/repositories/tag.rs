//! 标签仓库
//!
//! 项目和代码的词表操作成对实现，SQL 只差表名。

use crate::models::tag::{CodeSelectedTag, SelectedTag, Tag};
use crate::repositories::pg::PgRepository;
use crate::repositories::traits::TagRepositoryTrait;
use crate::DatabaseResult;

#[async_trait::async_trait]
impl TagRepositoryTrait for PgRepository {
    async fn search_project_tags(&self, keyword: &str) -> DatabaseResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT tag_id, name, cnt
            FROM hub.project_tags
            WHERE ($1 = '' OR name ILIKE $2)
            ORDER BY name
            "#,
        )
        .bind(keyword)
        .bind(format!("%{keyword}%"))
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn find_project_tag(&self, tag_id: i64) -> DatabaseResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, name, cnt FROM hub.project_tags WHERE tag_id = $1",
        )
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn insert_project_selected_tag(
        &self,
        project_id: i64,
        tag_id: i64,
    ) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.project_selected_tags (project_id, tag_id) VALUES ($1, $2)")
            .bind(project_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_project_selected_tags(
        &self,
        project_id: i64,
    ) -> DatabaseResult<Vec<SelectedTag>> {
        let rows = sqlx::query_as::<_, SelectedTag>(
            "SELECT id, project_id, tag_id FROM hub.project_selected_tags WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_project_selected_tags(&self, project_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.project_selected_tags WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_project_tag_cnt(&self, tag_id: i64, delta: i32) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            "UPDATE hub.project_tags SET cnt = cnt + $2 WHERE tag_id = $1 RETURNING cnt",
        )
        .bind(tag_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn tags_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.tag_id, t.name, t.cnt
            FROM hub.project_tags t
                     JOIN hub.project_selected_tags st ON st.tag_id = t.tag_id
            WHERE st.project_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn tags_of_projects(&self, project_ids: &[i64]) -> DatabaseResult<Vec<(i64, Tag)>> {
        let rows = sqlx::query_as::<_, (i64, i64, String, i32)>(
            r#"
            SELECT st.project_id, t.tag_id, t.name, t.cnt
            FROM hub.project_tags t
                     JOIN hub.project_selected_tags st ON st.tag_id = t.tag_id
            WHERE st.project_id = ANY ($1)
            ORDER BY t.name
            "#,
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(project_id, tag_id, name, cnt)| (project_id, Tag { tag_id, name, cnt }))
            .collect())
    }

    async fn search_code_tags(&self, keyword: &str) -> DatabaseResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT tag_id, name, cnt
            FROM hub.code_tags
            WHERE ($1 = '' OR name ILIKE $2)
            ORDER BY name
            "#,
        )
        .bind(keyword)
        .bind(format!("%{keyword}%"))
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn find_code_tag(&self, tag_id: i64) -> DatabaseResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, name, cnt FROM hub.code_tags WHERE tag_id = $1",
        )
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn insert_code_selected_tag(&self, code_id: i64, tag_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.code_selected_tags (code_id, tag_id) VALUES ($1, $2)")
            .bind(code_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_code_selected_tags(
        &self,
        code_id: i64,
    ) -> DatabaseResult<Vec<CodeSelectedTag>> {
        let rows = sqlx::query_as::<_, CodeSelectedTag>(
            "SELECT id, code_id, tag_id FROM hub.code_selected_tags WHERE code_id = $1",
        )
        .bind(code_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_code_selected_tags(&self, code_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.code_selected_tags WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_code_tag_cnt(&self, tag_id: i64, delta: i32) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            "UPDATE hub.code_tags SET cnt = cnt + $2 WHERE tag_id = $1 RETURNING cnt",
        )
        .bind(tag_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn tags_of_code(&self, code_id: i64) -> DatabaseResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.tag_id, t.name, t.cnt
            FROM hub.code_tags t
                     JOIN hub.code_selected_tags st ON st.tag_id = t.tag_id
            WHERE st.code_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(code_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn tags_of_codes(&self, code_ids: &[i64]) -> DatabaseResult<Vec<(i64, Tag)>> {
        let rows = sqlx::query_as::<_, (i64, i64, String, i32)>(
            r#"
            SELECT st.code_id, t.tag_id, t.name, t.cnt
            FROM hub.code_tags t
                     JOIN hub.code_selected_tags st ON st.tag_id = t.tag_id
            WHERE st.code_id = ANY ($1)
            ORDER BY t.name
            "#,
        )
        .bind(code_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code_id, tag_id, name, cnt)| (code_id, Tag { tag_id, name, cnt }))
            .collect())
    }
}
