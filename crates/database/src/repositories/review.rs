//! 代码评审仓库

use crate::models::review::{Review, SelectedReview};
use crate::repositories::pg::PgRepository;
use crate::repositories::traits::ReviewRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use tracing::debug;

const REVIEW_COLUMNS: &str =
    "review_id, code_id, user_id, content, selected, like_cnt, created_at, modified_at";

#[async_trait::async_trait]
impl ReviewRepositoryTrait for PgRepository {
    async fn insert_review(
        &self,
        code_id: i64,
        user_id: Option<i64>,
        content: &str,
    ) -> DatabaseResult<Review> {
        debug!("📝 插入评审: code_id={}, 匿名={}", code_id, user_id.is_none());

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO hub.reviews (code_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING review_id, code_id, user_id, content, selected,
                      like_cnt, created_at, modified_at
            "#,
        )
        .bind(code_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    async fn find_review_by_id(&self, review_id: i64) -> DatabaseResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM hub.reviews WHERE review_id = $1"
        ))
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn update_review_content(&self, review_id: i64, content: &str) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE hub.reviews SET content = $2, modified_at = now() WHERE review_id = $1",
        )
        .bind(review_id)
        .bind(content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("review {review_id}")));
        }
        Ok(())
    }

    async fn delete_review(&self, review_id: i64) -> DatabaseResult<()> {
        debug!("🗑️ 删除评审: review_id={}", review_id);

        let result = sqlx::query("DELETE FROM hub.reviews WHERE review_id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("review {review_id}")));
        }
        Ok(())
    }

    async fn delete_reviews_of_code(&self, code_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.reviews WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn reviews_of_code(&self, code_id: i64) -> DatabaseResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM hub.reviews
            WHERE code_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(code_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn update_review_selected(&self, review_id: i64, delta: i32) -> DatabaseResult<i32> {
        let selected = sqlx::query_scalar::<_, i32>(
            "UPDATE hub.reviews SET selected = selected + $2 WHERE review_id = $1 RETURNING selected",
        )
        .bind(review_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(selected)
    }

    async fn insert_selected_review(&self, code_id: i64, review_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.selected_reviews (code_id, review_id) VALUES ($1, $2)")
            .bind(code_id)
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_selected_reviews(&self, code_id: i64) -> DatabaseResult<Vec<SelectedReview>> {
        let rows = sqlx::query_as::<_, SelectedReview>(
            "SELECT id, code_id, review_id FROM hub.selected_reviews WHERE code_id = $1",
        )
        .bind(code_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn selected_reviews_of(&self, code_id: i64) -> DatabaseResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT r.review_id, r.code_id, r.user_id, r.content, r.selected,
                   r.like_cnt, r.created_at, r.modified_at
            FROM hub.reviews r
                     JOIN hub.selected_reviews sr ON sr.review_id = r.review_id
            WHERE sr.code_id = $1
            ORDER BY r.created_at
            "#,
        )
        .bind(code_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn delete_selected_reviews(&self, code_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.selected_reviews WHERE code_id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn has_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.review_likes WHERE review_id = $1 AND user_id = $2)",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.review_likes (review_id, user_id) VALUES ($1, $2)")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_review_like(&self, review_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.review_likes WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_review_like_cnt(&self, review_id: i64, delta: i32) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            "UPDATE hub.reviews SET like_cnt = like_cnt + $2 WHERE review_id = $1 RETURNING like_cnt",
        )
        .bind(review_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn delete_review_likes(&self, review_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.review_likes WHERE review_id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn liked_review_ids(
        &self,
        user_id: i64,
        review_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT review_id FROM hub.review_likes WHERE user_id = $1 AND review_id = ANY ($2)",
        )
        .bind(user_id)
        .bind(review_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
