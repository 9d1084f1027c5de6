//! 个人页接口
//!
//! 登录用户自己的项目/代码列表，以及公开的SVG统计卡片。

use crate::models::auth::Caller;
use crate::models::codes::CodeInfoRes;
use crate::models::common::{PageQuery, ReplyList};
use crate::models::err::AppError;
use crate::models::projects::ProjectInfoRes;
use crate::services::BackendService;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use color_eyre::Result;
use tracing::debug;
use validator::Validate;

/// 我写的项目
#[utoipa::path(get,
    path = "/mypage/project",
    tag = "mypage",
    params(PageQuery),
    responses(
        (status = 200, description = "项目列表", body = ReplyList<ProjectInfoRes>)
    ),
)]
pub async fn my_project_list<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReplyList<ProjectInfoRes>>, AppError> {
    page.validate()?;
    let user_id = caller.require()?;
    let (data, total) = state.service.my_projects(user_id, page.clone()).await?;
    Ok(Json(ReplyList {
        data,
        total,
        page_size: page.page_size,
        page_index: page.page_index,
    }))
}

/// 我收藏的项目
#[utoipa::path(get,
    path = "/mypage/project/favorite",
    tag = "mypage",
    params(PageQuery),
)]
pub async fn my_favorite_project_list<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReplyList<ProjectInfoRes>>, AppError> {
    page.validate()?;
    let user_id = caller.require()?;
    let (data, total) = state
        .service
        .my_favorite_projects(user_id, page.clone())
        .await?;
    Ok(Json(ReplyList {
        data,
        total,
        page_size: page.page_size,
        page_index: page.page_index,
    }))
}

/// 我反馈过的项目
#[utoipa::path(get,
    path = "/mypage/project/feedback",
    tag = "mypage",
    params(PageQuery),
)]
pub async fn my_feedback_project_list<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReplyList<ProjectInfoRes>>, AppError> {
    page.validate()?;
    let user_id = caller.require()?;
    let (data, total) = state
        .service
        .my_feedback_projects(user_id, page.clone())
        .await?;
    Ok(Json(ReplyList {
        data,
        total,
        page_size: page.page_size,
        page_index: page.page_index,
    }))
}

/// 我写的代码
#[utoipa::path(get,
    path = "/mypage/code",
    tag = "mypage",
    params(PageQuery),
    responses(
        (status = 200, description = "代码列表", body = ReplyList<CodeInfoRes>)
    ),
)]
pub async fn my_code_list<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReplyList<CodeInfoRes>>, AppError> {
    page.validate()?;
    let user_id = caller.require()?;
    let (data, total) = state.service.my_codes(user_id, page.clone()).await?;
    Ok(Json(ReplyList {
        data,
        total,
        page_size: page.page_size,
        page_index: page.page_index,
    }))
}

/// 我收藏的代码
#[utoipa::path(get,
    path = "/mypage/code/favorite",
    tag = "mypage",
    params(PageQuery),
)]
pub async fn my_favorite_code_list<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReplyList<CodeInfoRes>>, AppError> {
    page.validate()?;
    let user_id = caller.require()?;
    let (data, total) = state
        .service
        .my_favorite_codes(user_id, page.clone())
        .await?;
    Ok(Json(ReplyList {
        data,
        total,
        page_size: page.page_size,
        page_index: page.page_index,
    }))
}

/// 我评审过的代码
#[utoipa::path(get,
    path = "/mypage/code/review",
    tag = "mypage",
    params(PageQuery),
)]
pub async fn my_review_code_list<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(page): Query<PageQuery>,
) -> Result<Json<ReplyList<CodeInfoRes>>, AppError> {
    page.validate()?;
    let user_id = caller.require()?;
    let (data, total) = state
        .service
        .my_review_codes(user_id, page.clone())
        .await?;
    Ok(Json(ReplyList {
        data,
        total,
        page_size: page.page_size,
        page_index: page.page_index,
    }))
}

/// 用户统计卡片
///
/// 按用户名生成SVG统计卡片，可直接嵌在README里，无需登录。
#[utoipa::path(get,
    path = "/mypage/stat-card/{user_name}",
    tag = "mypage",
    responses(
        (status = 200, description = "SVG统计卡片", content_type = "image/svg+xml")
    ),
)]
pub async fn get_stat_card<S: BackendService>(
    State(state): State<AppState<S>>,
    Path(user_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    debug!("🖼️ 请求统计卡片 {user_name}");

    let svg = state.service.make_stat_card(&user_name).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
