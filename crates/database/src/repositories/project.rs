//! 项目仓库
//!
//! 负责项目版本行、点赞/收藏关联的数据库操作

use crate::models::project::{
    Project, ProjectCreate, ProjectInfo, ProjectSearchParams, ProjectSearchResult, ProjectSortKey,
    ProjectUpdate,
};
use crate::repositories::pg::{PgRepository, ProjectSearchRow};
use crate::repositories::traits::ProjectRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use tracing::debug;

const PROJECT_COLUMNS: &str = "project_id, num, version, title, introduction, img, closed, \
                               like_cnt, feedback_cnt, user_id, created_at, modified_at";

#[async_trait::async_trait]
impl ProjectRepositoryTrait for PgRepository {
    /// 插入一个新的项目版本行和对应的补充信息行
    ///
    /// 缩略图列走建表时的占位默认值，上传接口之后再覆盖。
    async fn insert_project(&self, create: ProjectCreate) -> DatabaseResult<Project> {
        debug!("📝 创建项目版本: num={}, version={}", create.num, create.version);

        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO hub.projects (num, version, title, introduction, like_cnt, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING project_id, num, version, title, introduction, img, closed,
                      like_cnt, feedback_cnt, user_id, created_at, modified_at
            "#,
        )
        .bind(create.num)
        .bind(create.version)
        .bind(&create.title)
        .bind(&create.introduction)
        .bind(create.like_cnt)
        .bind(create.user_id)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO hub.projects_info (project_id, url, notice, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(project.project_id)
        .bind(&create.url)
        .bind(&create.notice)
        .bind(&create.content)
        .execute(&self.pool)
        .await?;

        debug!("✅ 项目版本创建成功: project_id={}", project.project_id);
        Ok(project)
    }

    async fn find_project_by_id(&self, project_id: i64) -> DatabaseResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM hub.projects WHERE project_id = $1"
        ))
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn find_project_info(&self, project_id: i64) -> DatabaseResult<Option<ProjectInfo>> {
        let info = sqlx::query_as::<_, ProjectInfo>(
            "SELECT project_id, url, notice, content FROM hub.projects_info WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(info)
    }

    async fn find_project_versions(
        &self,
        num: i64,
        user_id: i64,
    ) -> DatabaseResult<Vec<Project>> {
        let versions = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM hub.projects
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

    async fn latest_project_version(
        &self,
        num: i64,
        user_id: i64,
    ) -> DatabaseResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM hub.projects
            WHERE num = $1 AND user_id = $2
            ORDER BY version DESC
            LIMIT 1
            "#
        ))
        .bind(num)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    async fn close_project_versions(&self, num: i64, user_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE hub.projects SET closed = TRUE WHERE num = $1 AND user_id = $2 AND closed = FALSE",
        )
        .bind(num)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn reopen_project_version(&self, project_id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE hub.projects SET closed = FALSE WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("project {project_id}")));
        }
        Ok(())
    }

    async fn update_project(&self, project_id: i64, update: ProjectUpdate) -> DatabaseResult<()> {
        debug!("🔄 更新项目版本: project_id={}", project_id);

        let result = sqlx::query(
            r#"
            UPDATE hub.projects
            SET title        = $2,
                introduction = $3,
                modified_at  = now()
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .bind(&update.title)
        .bind(&update.introduction)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("project {project_id}")));
        }

        sqlx::query(
            r#"
            UPDATE hub.projects_info
            SET url     = $2,
                notice  = $3,
                content = $4
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .bind(&update.url)
        .bind(&update.notice)
        .bind(&update.content)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_project_img(&self, project_id: i64, img: &str) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE hub.projects SET img = $2, modified_at = now() WHERE project_id = $1",
        )
        .bind(project_id)
        .bind(img)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("project {project_id}")));
        }
        Ok(())
    }

    async fn update_project_feedback_cnt(
        &self,
        project_id: i64,
        delta: i32,
    ) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE hub.projects
            SET feedback_cnt = feedback_cnt + $2
            WHERE project_id = $1
            RETURNING feedback_cnt
            "#,
        )
        .bind(project_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn update_project_like_cnt(&self, project_id: i64, delta: i32) -> DatabaseResult<i32> {
        let cnt = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE hub.projects
            SET like_cnt = like_cnt + $2
            WHERE project_id = $1
            RETURNING like_cnt
            "#,
        )
        .bind(project_id)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn delete_project_info(&self, project_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.projects_info WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_project(&self, project_id: i64) -> DatabaseResult<()> {
        debug!("🗑️ 删除项目版本: project_id={}", project_id);

        let result = sqlx::query("DELETE FROM hub.projects WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("project {project_id}")));
        }
        Ok(())
    }

    async fn delete_project_likes(&self, project_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.project_likes WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_project_favorites(&self, project_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.project_favorites WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 根据查询参数搜索项目
    ///
    /// # SQL 查询说明
    ///
    /// 使用 CTE（Common Table Expression）来组织查询：
    /// 1. 在 `filtered` 中完成关键字/关闭状态/标签的过滤
    /// 2. 使用 `COUNT(*) OVER ()` 窗口函数获取过滤后的总记录数
    /// 3. 标签过滤要求版本行带上 **全部** 请求的标签，
    ///    通过对关联行计数再与请求数组长度比较实现
    /// 4. 排序键用 `CASE` 分支选择，未命中的分支为 NULL 不影响排序
    async fn search_projects(
        &self,
        params: &ProjectSearchParams,
    ) -> DatabaseResult<ProjectSearchResult> {
        debug!(
            "🔍 搜索项目 - 关键字: {:?}, 标签: {:?}, 包含关闭: {}",
            params.keyword, params.tag_ids, params.include_closed
        );

        let like_param = format!("%{}%", params.keyword);
        let sort_token = match params.sort {
            ProjectSortKey::Modified => "modified",
            ProjectSortKey::Likes => "likes",
            ProjectSortKey::Feedbacks => "feedbacks",
        };

        let rows = sqlx::query_as::<_, ProjectSearchRow>(
            r#"
            WITH filtered AS (
                SELECT p.project_id, p.num, p.version, p.title, p.introduction, p.img,
                       p.closed, p.like_cnt, p.feedback_cnt, p.user_id,
                       p.created_at, p.modified_at,
                       COUNT(*) OVER () AS total_count
                FROM hub.projects p
                WHERE ($1 = '' OR p.title ILIKE $2 OR p.introduction ILIKE $2)
                  AND ($3 OR p.closed = FALSE)
                  AND (cardinality($4::BIGINT[]) = 0 OR
                       (SELECT COUNT(*)
                        FROM hub.project_selected_tags st
                        WHERE st.project_id = p.project_id
                          AND st.tag_id = ANY ($4::BIGINT[])) = cardinality($4::BIGINT[]))
            )
            SELECT *
            FROM filtered
            ORDER BY CASE WHEN $5 = 'likes' THEN like_cnt END DESC,
                     CASE WHEN $5 = 'feedbacks' THEN feedback_cnt END DESC,
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
        let projects: Vec<Project> = rows.into_iter().map(|r| r.project).collect();

        debug!("✅ 搜索完成 - 本页 {} 个项目，总计 {} 个", projects.len(), total);
        Ok(ProjectSearchResult { projects, total })
    }

    async fn has_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.project_likes WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.project_likes (project_id, user_id) VALUES ($1, $2)")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_project_like(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.project_likes WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn has_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hub.project_favorites WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO hub.project_favorites (project_id, user_id) VALUES ($1, $2)")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_project_favorite(&self, project_id: i64, user_id: i64) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM hub.project_favorites WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count_project_favorites(&self, project_id: i64) -> DatabaseResult<i64> {
        let cnt = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM hub.project_favorites WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cnt)
    }

    async fn liked_project_ids(
        &self,
        user_id: i64,
        project_ids: &[i64],
    ) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT project_id FROM hub.project_likes WHERE user_id = $1 AND project_id = ANY ($2)",
        )
        .bind(user_id)
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
