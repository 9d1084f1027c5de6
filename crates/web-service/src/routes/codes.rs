//! 代码相关接口
//!
//! 代码片段的登记/升级/搜索/详情，以及点赞收藏和评审子资源。
//! 路由形状与项目侧保持对称，便于前端统一处理。

use crate::models::auth::Caller;
use crate::models::codes::{
    CodeDetailRes, CodeInfoRes, CodeReq, CodeSearch, ReviewReq, ReviewUpdateReq,
};
use crate::models::common::{Reply, ReplyList};
use crate::models::err::AppError;
use crate::models::projects::{TagRes, TagSearch};
use crate::services::BackendService;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use color_eyre::Result;
use tracing::debug;
use validator::Validate;

/// 搜索代码
///
/// 按关键字/标签/排序方式搜索代码版本，支持分页。
/// 带身份时卡片里的 `liked` 反映调用者自己的点赞状态。
#[utoipa::path(get,
    path = "/code",
    tag = "codes",
    params(CodeSearch),
    responses(
        (status = 200, description = "搜索结果", body = ReplyList<CodeInfoRes>)
    ),
)]
pub async fn find_codes<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Query(search): Query<CodeSearch>,
) -> Result<Json<ReplyList<CodeInfoRes>>, AppError> {
    debug!("🔍 搜索代码 {:#?}", search);

    search.validate()?;

    let page_size = search.page_size;
    let page_index = search.page_index;
    let (data, total) = state.service.get_code_list(search, caller.0).await?;

    Ok(Json(ReplyList {
        data,
        total,
        page_size,
        page_index,
    }))
}

/// 登记代码
///
/// `code_id` 为 -1 时登记全新代码，否则对已有版本组升级一个新版本。
/// 可以通过 `project_id` 挂到作者自己的项目版本下。
#[utoipa::path(post,
    path = "/code",
    tag = "codes",
    request_body = CodeReq,
    responses(
        (status = 200, description = "新版本行ID", body = Reply<i64>)
    ),
)]
pub async fn create_code<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<CodeReq>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("📝 登记代码 {:#?}", req);

    req.validate()?;
    let user_id = caller.require()?;
    let code_id = state.service.insert_code(req, user_id).await?;

    Ok(Json(Reply { data: code_id }))
}

/// 修改代码
#[utoipa::path(put,
    path = "/code",
    tag = "codes",
    request_body = CodeReq,
)]
pub async fn update_code<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<CodeReq>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("🔄 修改代码 {:#?}", req);

    req.validate()?;
    let user_id = caller.require()?;
    let code_id = req.code_id;
    state.service.update_code(req, user_id).await?;

    Ok(Json(Reply { data: code_id }))
}

/// 查询代码详情
#[utoipa::path(get,
    path = "/code/{code_id}",
    tag = "codes",
    responses(
        (status = 200, description = "代码详情", body = Reply<CodeDetailRes>)
    ),
)]
pub async fn get_code<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(code_id): Path<i64>,
) -> Result<Json<Reply<CodeDetailRes>>, AppError> {
    debug!("🔍 查询代码详情 {code_id}");

    let detail = state.service.get_code(code_id, caller.0).await?;
    Ok(Json(Reply { data: detail }))
}

/// 删除代码版本
#[utoipa::path(delete, path = "/code/{code_id}", tag = "codes")]
pub async fn delete_code<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(code_id): Path<i64>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("🗑️ 删除代码 {code_id}");

    let user_id = caller.require()?;
    state.service.delete_code(code_id, user_id).await?;

    Ok(Json(Reply { data: code_id }))
}

/// 点赞/取消点赞代码，返回最新点赞数
#[utoipa::path(post, path = "/code/like/{code_id}", tag = "codes")]
pub async fn like_code<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(code_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    let user_id = caller.require()?;
    let cnt = state.service.like_code(code_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 收藏/取消收藏代码，返回最新收藏数
#[utoipa::path(post, path = "/code/favorite/{code_id}", tag = "codes")]
pub async fn favorite_code<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(code_id): Path<i64>,
) -> Result<Json<Reply<i64>>, AppError> {
    let user_id = caller.require()?;
    let cnt = state.service.favorite_code(code_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 搜索代码标签
#[utoipa::path(get,
    path = "/code/tag",
    tag = "codes",
    params(TagSearch),
    responses(
        (status = 200, description = "标签列表", body = Reply<Vec<TagRes>>)
    ),
)]
pub async fn find_code_tags<S: BackendService>(
    State(state): State<AppState<S>>,
    Query(search): Query<TagSearch>,
) -> Result<Json<Reply<Vec<TagRes>>>, AppError> {
    let keyword = search.keyword.unwrap_or_default();
    let tags = state.service.search_code_tags(&keyword).await?;
    Ok(Json(Reply { data: tags }))
}

/// 写代码评审
///
/// 匿名也可以写，匿名评审之后无法修改或删除。返回代码最新的评审总数。
#[utoipa::path(post,
    path = "/code/review",
    tag = "codes",
    request_body = ReviewReq,
    responses(
        (status = 200, description = "代码当前评审总数", body = Reply<i32>)
    ),
)]
pub async fn create_review<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<ReviewReq>,
) -> Result<Json<Reply<i32>>, AppError> {
    debug!("💬 写评审 {:#?}", req);

    req.validate()?;
    let cnt = state.service.insert_review(req, caller.0).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 修改评审
///
/// 只有作者本人能改，已被采纳的评审返回409。
#[utoipa::path(put,
    path = "/code/review",
    tag = "codes",
    request_body = ReviewUpdateReq,
)]
pub async fn update_review<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<ReviewUpdateReq>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("🔄 修改评审 {:#?}", req);

    req.validate()?;
    let user_id = caller.require()?;
    let review_id = req.review_id;
    state.service.update_review(req, user_id).await?;
    Ok(Json(Reply { data: review_id }))
}

/// 删除评审，返回代码最新的评审总数
#[utoipa::path(delete, path = "/code/review/{review_id}", tag = "codes")]
pub async fn delete_review<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(review_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    debug!("🗑️ 删除评审 {review_id}");

    let user_id = caller.require()?;
    let cnt = state.service.delete_review(review_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 点赞/取消点赞评审，返回最新点赞数
#[utoipa::path(post, path = "/code/review/like/{review_id}", tag = "codes")]
pub async fn like_review<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(review_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    let user_id = caller.require()?;
    let cnt = state.service.like_review(review_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}
