//! 个人页仓库
//!
//! 个人页的几个列表共用一套 CTE + 窗口函数的分页写法。

use crate::models::code::{Code, CodeSearchResult};
use crate::models::project::{Project, ProjectSearchResult};
use crate::models::user::UserStats;
use crate::repositories::pg::{CodeSearchRow, PgRepository, ProjectSearchRow};
use crate::repositories::traits::MypageRepositoryTrait;
use crate::DatabaseResult;

async fn fetch_project_page(
    repo: &PgRepository,
    sql: &str,
    user_id: i64,
    page_size: i64,
    offset: i64,
) -> DatabaseResult<ProjectSearchResult> {
    let rows = sqlx::query_as::<_, ProjectSearchRow>(sql)
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&repo.pool)
        .await?;

    let total = rows.first().map(|r| r.total_count).unwrap_or(0) as u32;
    let projects: Vec<Project> = rows.into_iter().map(|r| r.project).collect();
    Ok(ProjectSearchResult { projects, total })
}

async fn fetch_code_page(
    repo: &PgRepository,
    sql: &str,
    user_id: i64,
    page_size: i64,
    offset: i64,
) -> DatabaseResult<CodeSearchResult> {
    let rows = sqlx::query_as::<_, CodeSearchRow>(sql)
        .bind(user_id)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&repo.pool)
        .await?;

    let total = rows.first().map(|r| r.total_count).unwrap_or(0) as u32;
    let codes: Vec<Code> = rows.into_iter().map(|r| r.code).collect();
    Ok(CodeSearchResult { codes, total })
}

#[async_trait::async_trait]
impl MypageRepositoryTrait for PgRepository {
    async fn my_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult> {
        fetch_project_page(
            self,
            r#"
            WITH filtered AS (
                SELECT p.project_id, p.num, p.version, p.title, p.introduction, p.img,
                       p.closed, p.like_cnt, p.feedback_cnt, p.user_id,
                       p.created_at, p.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.projects p
                WHERE p.user_id = $1
            )
            SELECT * FROM filtered
            ORDER BY modified_at DESC
            LIMIT $2 OFFSET $3
            "#,
            user_id,
            page_size,
            offset,
        )
        .await
    }

    async fn my_favorite_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult> {
        fetch_project_page(
            self,
            r#"
            WITH filtered AS (
                SELECT p.project_id, p.num, p.version, p.title, p.introduction, p.img,
                       p.closed, p.like_cnt, p.feedback_cnt, p.user_id,
                       p.created_at, p.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.projects p
                         JOIN hub.project_favorites f ON f.project_id = p.project_id
                WHERE f.user_id = $1
            )
            SELECT * FROM filtered
            ORDER BY modified_at DESC
            LIMIT $2 OFFSET $3
            "#,
            user_id,
            page_size,
            offset,
        )
        .await
    }

    async fn my_feedback_projects(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<ProjectSearchResult> {
        fetch_project_page(
            self,
            r#"
            WITH filtered AS (
                SELECT p.project_id, p.num, p.version, p.title, p.introduction, p.img,
                       p.closed, p.like_cnt, p.feedback_cnt, p.user_id,
                       p.created_at, p.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.projects p
                WHERE EXISTS (SELECT 1
                              FROM hub.feedbacks fb
                              WHERE fb.project_id = p.project_id
                                AND fb.user_id = $1)
            )
            SELECT * FROM filtered
            ORDER BY modified_at DESC
            LIMIT $2 OFFSET $3
            "#,
            user_id,
            page_size,
            offset,
        )
        .await
    }

    async fn my_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult> {
        fetch_code_page(
            self,
            r#"
            WITH filtered AS (
                SELECT c.code_id, c.num, c.version, c.title, c.content, c.language,
                       c.closed, c.like_cnt, c.review_cnt, c.user_id, c.project_id,
                       c.created_at, c.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.codes c
                WHERE c.user_id = $1
            )
            SELECT * FROM filtered
            ORDER BY modified_at DESC
            LIMIT $2 OFFSET $3
            "#,
            user_id,
            page_size,
            offset,
        )
        .await
    }

    async fn my_favorite_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult> {
        fetch_code_page(
            self,
            r#"
            WITH filtered AS (
                SELECT c.code_id, c.num, c.version, c.title, c.content, c.language,
                       c.closed, c.like_cnt, c.review_cnt, c.user_id, c.project_id,
                       c.created_at, c.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.codes c
                         JOIN hub.code_favorites f ON f.code_id = c.code_id
                WHERE f.user_id = $1
            )
            SELECT * FROM filtered
            ORDER BY modified_at DESC
            LIMIT $2 OFFSET $3
            "#,
            user_id,
            page_size,
            offset,
        )
        .await
    }

    async fn my_review_codes(
        &self,
        user_id: i64,
        page_size: i64,
        offset: i64,
    ) -> DatabaseResult<CodeSearchResult> {
        fetch_code_page(
            self,
            r#"
            WITH filtered AS (
                SELECT c.code_id, c.num, c.version, c.title, c.content, c.language,
                       c.closed, c.like_cnt, c.review_cnt, c.user_id, c.project_id,
                       c.created_at, c.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.codes c
                WHERE EXISTS (SELECT 1
                              FROM hub.reviews r
                              WHERE r.code_id = c.code_id
                                AND r.user_id = $1)
            )
            SELECT * FROM filtered
            ORDER BY modified_at DESC
            LIMIT $2 OFFSET $3
            "#,
            user_id,
            page_size,
            offset,
        )
        .await
    }

    async fn user_stats(&self, user_id: i64) -> DatabaseResult<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT (SELECT COUNT(*) FROM hub.feedbacks WHERE user_id = $1)                    AS feedback_cnt,
                   (SELECT COUNT(*) FROM hub.reviews WHERE user_id = $1)                      AS code_review_cnt,
                   (SELECT COUNT(*) FROM hub.feedbacks WHERE user_id = $1 AND selected > 0)   AS included_feedback_cnt,
                   (SELECT COUNT(*) FROM hub.reviews WHERE user_id = $1 AND selected > 0)     AS included_code_review_cnt,
                   (SELECT COUNT(*) - COUNT(DISTINCT num) FROM hub.projects WHERE user_id = $1) AS project_refactor_cnt,
                   (SELECT COUNT(*) - COUNT(DISTINCT num) FROM hub.codes WHERE user_id = $1)    AS code_refactor_cnt
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
