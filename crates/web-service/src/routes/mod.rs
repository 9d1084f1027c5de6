//! 路由入口
//!
//! 提供 [`create_app_router`] 函数，导出当前App的所有路由。
//!
//! 用户可以在导出路由时传入共享数据 shared_state，这样所有路由函数都可以访问。

use crate::routes::codes::__path_create_code;
use crate::routes::codes::__path_create_review;
use crate::routes::codes::__path_delete_code;
use crate::routes::codes::__path_delete_review;
use crate::routes::codes::__path_favorite_code;
use crate::routes::codes::__path_find_code_tags;
use crate::routes::codes::__path_find_codes;
use crate::routes::codes::__path_get_code;
use crate::routes::codes::__path_like_code;
use crate::routes::codes::__path_like_review;
use crate::routes::codes::__path_update_code;
use crate::routes::codes::__path_update_review;
use crate::routes::codes::{
    create_code, create_review, delete_code, delete_review, favorite_code, find_code_tags,
    find_codes, get_code, like_code, like_review, update_code, update_review,
};
use crate::routes::mypage::__path_get_stat_card;
use crate::routes::mypage::__path_my_code_list;
use crate::routes::mypage::__path_my_favorite_code_list;
use crate::routes::mypage::__path_my_favorite_project_list;
use crate::routes::mypage::__path_my_feedback_project_list;
use crate::routes::mypage::__path_my_project_list;
use crate::routes::mypage::__path_my_review_code_list;
use crate::routes::mypage::{
    get_stat_card, my_code_list, my_favorite_code_list, my_favorite_project_list,
    my_feedback_project_list, my_project_list, my_review_code_list,
};
use crate::routes::projects::__path_check_project_url;
use crate::routes::projects::__path_complain_feedback;
use crate::routes::projects::__path_connect_codes;
use crate::routes::projects::__path_create_feedback;
use crate::routes::projects::__path_create_project;
use crate::routes::projects::__path_delete_feedback;
use crate::routes::projects::__path_delete_project;
use crate::routes::projects::__path_favorite_project;
use crate::routes::projects::__path_find_feedbacks;
use crate::routes::projects::__path_find_project_tags;
use crate::routes::projects::__path_find_projects;
use crate::routes::projects::__path_get_project;
use crate::routes::projects::__path_is_project_open;
use crate::routes::projects::__path_like_feedback;
use crate::routes::projects::__path_like_project;
use crate::routes::projects::__path_update_feedback;
use crate::routes::projects::__path_update_project;
use crate::routes::projects::__path_update_thumbnail;
use crate::routes::projects::{
    check_project_url, complain_feedback, connect_codes, create_feedback, create_project,
    delete_feedback, delete_project, favorite_project, find_feedbacks, find_project_tags,
    find_projects, get_project, is_project_open, like_feedback, like_project, update_feedback,
    update_project, update_thumbnail,
};
use crate::{services::BackendService, AppState};
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_scalar::{Scalar, Servable};

pub mod codes;
pub mod mypage;
pub mod projects;

/// 导出当前App的所有路由
///
/// ## 参数定义
/// - state: 共享数据，参考 [`AppState`] 定义。存放业务服务实例供各 handler 使用。
///
/// ## **❗️注意事项：**
///
/// 由于 [`routes!`] 宏限制，同一个宏调用里只能放路径相同的接口，
/// 不同路径必须拆成多个 `.routes()` 调用，否则会Panic。
fn routers<S: BackendService>(state: AppState<S>) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(find_projects, create_project, update_project))
        .routes(routes!(get_project, delete_project))
        .routes(routes!(update_thumbnail))
        .routes(routes!(connect_codes))
        .routes(routes!(like_project))
        .routes(routes!(favorite_project))
        .routes(routes!(is_project_open))
        .routes(routes!(check_project_url))
        .routes(routes!(find_project_tags))
        .routes(routes!(create_feedback, update_feedback))
        .routes(routes!(find_feedbacks))
        .routes(routes!(delete_feedback))
        .routes(routes!(like_feedback))
        .routes(routes!(complain_feedback))
        .routes(routes!(find_codes, create_code, update_code))
        .routes(routes!(get_code, delete_code))
        .routes(routes!(like_code))
        .routes(routes!(favorite_code))
        .routes(routes!(find_code_tags))
        .routes(routes!(create_review, update_review))
        .routes(routes!(delete_review))
        .routes(routes!(like_review))
        .routes(routes!(my_project_list))
        .routes(routes!(my_favorite_project_list))
        .routes(routes!(my_feedback_project_list))
        .routes(routes!(my_code_list))
        .routes(routes!(my_favorite_code_list))
        .routes(routes!(my_review_code_list))
        .routes(routes!(get_stat_card))
        .with_state(state)
}

/// 创建当前App的路由
///
/// 完成以下功能：
/// - 生成OpenAPI文档
/// - 生成App路由
/// - 使用Scalar作为最终在线文档格式
///
/// 由于使用了 `utoipa` 库来自动化生成`openapi`文档，因此我们没有使用原生的 [`Router`]，而是使用了
/// [`OpenApiRouter`] 。
pub fn create_app_router<S: BackendService>(shared_state: AppState<S>) -> Router {
    // 当前项目的OpenAPI声明
    #[derive(OpenApi)]
    #[openapi(
        tags(
            (name = "projects", description = "项目的版本管理、反馈与互动接口"),
            (name = "codes", description = "代码片段的版本管理与评审接口"),
            (name = "mypage", description = "个人页列表与统计卡片接口")
        ),
    )]
    struct ApiDoc;

    // 使用`utoipa_axum`提供的OpenApiRouter来创建路由。
    // 同时传递共享状态数据到路由中供使用。
    // 最终拿到的变量：
    // - router: Axum的Router，实际的路由对象
    // - api: utoipa的OpenApi，生成的OpenAPI对象
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v1", routers(shared_state))
        .split_for_parts();

    // 合并文档路由，用户可通过 /docs 访问文档网页地址
    router.merge(Scalar::with_url("/docs", api))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::USER_ID_HEADER;
    use crate::services::testing::{test_service, test_service_with, StubUrlChecker};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use database::MemoryRepository;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> (Router, MemoryRepository) {
        let (service, repo) = test_service();
        let app = create_app_router(AppState {
            service: Arc::new(service),
        });
        (app, repo)
    }

    fn json_request(
        method: &str,
        uri: &str,
        user_id: Option<i64>,
        body: serde_json::Value,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header(USER_ID_HEADER, user_id.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn project_body(project_id: i64, title: &str) -> serde_json::Value {
        serde_json::json!({
            "project_id": project_id,
            "title": title,
            "introduction": "intro",
            "url": "https://example.com",
            "notice": "notice",
            "content": "content",
        })
    }

    #[tokio::test]
    async fn create_then_get_project() {
        let (app, repo) = test_app();
        let writer = repo.seed_user("alice").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/project",
                Some(writer.user_id),
                project_body(-1, "market"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let project_id = reply["data"].as_i64().unwrap();

        // 匿名也能看详情
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/project/{project_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply["data"]["title"], "market");
        assert_eq!(reply["data"]["liked"], false);
    }

    #[tokio::test]
    async fn anonymous_create_is_not_found() {
        let (app, _repo) = test_app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/project",
                None,
                project_body(-1, "market"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_payload_is_bad_request() {
        let (app, repo) = test_app();
        let writer = repo.seed_user("alice").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/project",
                Some(writer.user_id),
                project_body(-1, ""),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_user_header_is_bad_request() {
        let (app, _repo) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/project")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(USER_ID_HEADER, "abc")
                    .body(Body::from(project_body(-1, "market").to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stale_version_update_is_conflict() {
        let (app, repo) = test_app();
        let writer = repo.seed_user("alice").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/project",
                Some(writer.user_id),
                project_body(-1, "market"),
            ))
            .await
            .unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let v1 = reply["data"].as_i64().unwrap();

        // 升级出 v2，再改 v1 就该撞上 409
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/project",
                Some(writer.user_id),
                project_body(v1, "market"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/v1/project",
                Some(writer.user_id),
                project_body(v1, "renamed"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let (app, _repo) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/project/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_returns_paged_envelope() {
        let (app, repo) = test_app();
        let writer = repo.seed_user("alice").await;

        for title in ["market", "diary"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/project",
                    Some(writer.user_id),
                    project_body(-1, title),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/project?keyword=market&page_size=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let reply: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(reply["total"], 1);
        assert_eq!(reply["page_size"], 5);
        assert_eq!(reply["page_index"], 1);
        assert_eq!(reply["data"][0]["title"], "market");
    }

    #[tokio::test]
    async fn stat_card_served_as_svg() {
        let path = std::env::temp_dir().join("stat-card-route-test.svg");
        tokio::fs::write(&path, "<svg>${feedbackCnt}</svg>")
            .await
            .unwrap();
        let (service, repo) =
            test_service_with(StubUrlChecker(true), path.to_string_lossy().into_owned());
        repo.seed_user("alice").await;
        let app = create_app_router(AppState {
            service: Arc::new(service),
        });

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/mypage/stat-card/alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"<svg>0</svg>");
    }

    #[tokio::test]
    async fn docs_page_is_served() {
        let (app, _repo) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/docs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
