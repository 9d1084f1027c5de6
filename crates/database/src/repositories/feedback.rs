//! 项目反馈仓库

use crate::models::feedback::{Feedback, SelectedFeedback};
use crate::repositories::pg::PgRepository;
use crate::repositories::traits::FeedbackRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use tracing::debug;

const FEEDBACK_COLUMNS: &str = "feedback_id, project_id, user_id, content, selected, \
                                like_cnt, complained, created_at, modified_at";

#[async_trait::async_trait]
impl FeedbackRepositoryTrait for PgRepository {
    async fn insert_feedback(
        &self,
        project_id: i64,
        user_id: Option<i64>,
        content: &str,
    ) -> DatabaseResult<Feedback> {
        debug!("📝 插入反馈: project_id={}, 匿名={}", project_id, user_id.is_none());

        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO hub.feedbacks (project_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING feedback_id, project_id, user_id, content, selected,
                      like_cnt, complained, created_at, modified_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(feedback)
    }

    async fn find_feedback_by_id(&self, feedback_id: i64) -> DatabaseResult<Option<Feedback>> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM hub.feedbacks WHERE feedback_id = $1"
        ))
        .bind(feedback_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(feedback)
    }

    async fn update_feedback_content(
        &self,
        feedback_id: i64,
        content: &str,
    ) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE hub.feedbacks SET content = $2, modified_at = now() WHERE feedback_id = $1",
        )
        .bind(feedback_id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("feedback {feedback_id}")));
        }
        Ok(())
    }

    async fn delete_feedback(&self, feedback_id: i64) -> DatabaseResult<()> {
        debug!("🗑️ 删除反馈: feedback_id={}", feedback_id);

        let result = sqlx::query("DELETE FROM hub.feedbacks WHERE feedback_id = $1")
            .bind(feedback_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("feedback {feedback_id}")));
        }
        Ok(())
    }

    async fn delete_feedbacks_of_project(&self, project_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.feedbacks WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn feedbacks_of_project(&self, project_id: i64) -> DatabaseResult<Vec<Feedback>> {
        let feedbacks = sqlx::query_as::<_, Feedback>(&format!(
            r#"
            SELECT {FEEDBACK_COLUMNS}
            FROM hub.feedbacks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedbacks)
    }

    async fn feedbacks_of_projects(&self, project_ids: &[i64]) -> DatabaseResult<Vec<Feedback>> {
        let feedbacks = sqlx::query_as::<_, Feedback>(&format!(
            r#"
            SELECT {FEEDBACK_COLUMNS}
            FROM hub.feedbacks
            WHERE project_id = ANY ($1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedbacks)
    }

    async fn update_feedback_selected(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let selected = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE hub.feedbacks
            SET selected = selected + $2
            WHERE feedback_id = $1
            RETURNING selected
            "#,
        )
        .bind(feedback_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(selected)
    }

    async fn insert_selected_feedback(
        &self,
        project_id: i64,
        feedback_id: i64,
    ) -> DatabaseResult<()> {
        sqlx::query(
            "INSERT INTO hub.selected_feedbacks (project_id, feedback_id) VALUES ($1, $2)",
        )
        .bind(project_id)
        .bind(feedback_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_selected_feedbacks(
        &self,
        project_id: i64,
    ) -> DatabaseResult<Vec<SelectedFeedback>> {
        let rows = sqlx::query_as::<_, SelectedFeedback>(
            "SELECT id, project_id, feedback_id FROM hub.selected_feedbacks WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn selected_feedbacks_of(&self, project_id: i64) -> DatabaseResult<Vec<Feedback>> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT f.feedback_id, f.project_id, f.user_id, f.content, f.selected,
                   f.like_cnt, f.complained, f.created_at, f.modified_at
            FROM hub.feedbacks f
                     JOIN hub.selected_feedbacks sf ON sf.feedback_id = f.feedback_id
            WHERE sf.project_id = $1
            ORDER BY f.created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(feedbacks)
    }

    async fn delete_selected_feedbacks(&self, project_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.selected_feedbacks WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn has_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.feedback_likes WHERE feedback_id = $1 AND user_id = $2)",
        )
        .bind(feedback_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.feedback_likes (feedback_id, user_id) VALUES ($1, $2)")
            .bind(feedback_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_feedback_like(&self, feedback_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.feedback_likes WHERE feedback_id = $1 AND user_id = $2")
            .bind(feedback_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_feedback_like_cnt(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE hub.feedbacks
            SET like_cnt = like_cnt + $2
            WHERE feedback_id = $1
            RETURNING like_cnt
            "#,
        )
        .bind(feedback_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn delete_feedback_likes(&self, feedback_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.feedback_likes WHERE feedback_id = $1")
            .bind(feedback_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn liked_feedback_ids(
        &self,
        user_id: i64,
        feedback_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT feedback_id FROM hub.feedback_likes WHERE user_id = $1 AND feedback_id = ANY ($2)",
        )
        .bind(user_id)
        .bind(feedback_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn has_feedback_complain(
        &self,
        feedback_id: i64,
        user_id: i64,
    ) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.feedback_complains WHERE feedback_id = $1 AND user_id = $2)",
        )
        .bind(feedback_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_feedback_complain(
        &self,
        feedback_id: i64,
        user_id: i64,
    ) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.feedback_complains (feedback_id, user_id) VALUES ($1, $2)")
            .bind(feedback_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_feedback_complained(
        &self,
        feedback_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let complained = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE hub.feedbacks
            SET complained = complained + $2
            WHERE feedback_id = $1
            RETURNING complained
            "#,
        )
        .bind(feedback_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(complained)
    }

    async fn delete_feedback_complains(&self, feedback_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.feedback_complains WHERE feedback_id = $1")
            .bind(feedback_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
