//! 项目相关接口
//!
//! 项目的登记/升级/搜索/详情，以及缩略图、点赞收藏、反馈等子资源。
//!
//! 所有需要身份的接口都通过 [`Caller`] 从 `x-user-id` 头取调用者，
//! 匿名可用的接口（详情、写反馈）把 `Caller` 原样传给服务层处理。

use crate::models::auth::Caller;
use crate::models::common::{Reply, ReplyList};
use crate::models::err::AppError;
use crate::models::projects::{
    ConnectCodesReq, FeedbackInfoRes, FeedbackReq, FeedbackUpdateReq, ProjectDetailRes,
    ProjectInfoRes, ProjectReq, ProjectSearch, TagRes, TagSearch, UrlCheckReq,
};
use crate::services::BackendService;
use crate::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use color_eyre::Result;
use tracing::debug;
use validator::Validate;

/// 搜索项目
///
/// 按关键字/标签/排序方式搜索项目版本，支持分页。
/// 默认只返回每个版本组的打开版本，`closed=1` 时把历史版本也带出来。
///
/// 查询参数由 [`ProjectSearch`] 决定，全部为可选参数。
#[utoipa::path(get,
    path = "/project",
    tag = "projects",
    params(ProjectSearch),
    responses(
        (status = 200, description = "搜索结果", body = ReplyList<ProjectInfoRes>)
    ),
)]
pub async fn find_projects<S: BackendService>(
    State(state): State<AppState<S>>,
    Query(search): Query<ProjectSearch>,
) -> Result<Json<ReplyList<ProjectInfoRes>>, AppError> {
    debug!("🔍 搜索项目 {:#?}", search);

    // 验证输入参数，确保有效性
    search.validate()?;

    let page_size = search.page_size;
    let page_index = search.page_index;
    let (data, total) = state.service.get_project_list(search).await?;

    Ok(Json(ReplyList {
        data,
        total,
        page_size,
        page_index,
    }))
}

/// 登记项目
///
/// `project_id` 为 -1 时登记全新项目，否则对已有版本组升级一个新版本。
/// 返回新插入的版本行ID。
#[utoipa::path(post,
    path = "/project",
    tag = "projects",
    request_body = ProjectReq,
    responses(
        (status = 200, description = "新版本行ID", body = Reply<i64>)
    ),
)]
pub async fn create_project<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<ProjectReq>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("📝 登记项目 {:#?}", req);

    req.validate()?;
    let user_id = caller.require()?;
    let project_id = state.service.insert_project(req, user_id).await?;

    Ok(Json(Reply { data: project_id }))
}

/// 修改项目
///
/// 只允许作者修改版本组的打开头部版本，旧版本返回409。
#[utoipa::path(put,
    path = "/project",
    tag = "projects",
    request_body = ProjectReq,
    responses(
        (status = 200, description = "被修改的版本行ID", body = Reply<i64>)
    ),
)]
pub async fn update_project<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<ProjectReq>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("🔄 修改项目 {:#?}", req);

    req.validate()?;
    let user_id = caller.require()?;
    let project_id = req.project_id;
    state.service.update_project(req, user_id).await?;

    Ok(Json(Reply { data: project_id }))
}

/// 查询项目详情
///
/// 匿名可访问；带身份时返回的 `liked`/`favorite` 反映调用者自己的状态。
#[utoipa::path(get,
    path = "/project/{project_id}",
    tag = "projects",
    responses(
        (status = 200, description = "项目详情", body = Reply<ProjectDetailRes>)
    ),
)]
pub async fn get_project<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<ProjectDetailRes>>, AppError> {
    debug!("🔍 查询项目详情 {project_id}");

    let detail = state.service.get_project(project_id, caller.0).await?;
    Ok(Json(Reply { data: detail }))
}

/// 删除项目版本
#[utoipa::path(delete, path = "/project/{project_id}", tag = "projects")]
pub async fn delete_project<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("🗑️ 删除项目 {project_id}");

    let user_id = caller.require()?;
    state.service.delete_project(project_id, user_id).await?;

    Ok(Json(Reply { data: project_id }))
}

/// 上传项目缩略图
///
/// multipart 表单的 `thumbnail` 字段携带图片内容，
/// 存储后按 `作者名_版本组_版本号.扩展名` 命名，返回公网URL。
#[utoipa::path(post,
    path = "/project/thumbnail/{project_id}",
    tag = "projects",
    responses(
        (status = 200, description = "缩略图URL", body = Reply<String>)
    ),
)]
pub async fn update_thumbnail<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Reply<String>>, AppError> {
    debug!("🖼️ 上传项目缩略图 {project_id}");

    let user_id = caller.require()?;
    let mut file_name = String::new();
    let mut data = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("解析上传内容失败: {e}")))?
    {
        if field.name() == Some("thumbnail") {
            file_name = field.file_name().unwrap_or("thumbnail.png").to_string();
            data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("读取上传内容失败: {e}")))?
                .to_vec();
        }
    }

    let url = state
        .service
        .update_thumbnail(project_id, user_id, &file_name, data)
        .await?;
    Ok(Json(Reply { data: url }))
}

/// 关联代码到项目
///
/// 把作者自己的代码版本挂到这个项目版本下，返回成功关联的数量。
#[utoipa::path(post,
    path = "/project/connect/{project_id}",
    tag = "projects",
    request_body = ConnectCodesReq,
    responses(
        (status = 200, description = "关联数量", body = Reply<u32>)
    ),
)]
pub async fn connect_codes<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
    Json(req): Json<ConnectCodesReq>,
) -> Result<Json<Reply<u32>>, AppError> {
    debug!("🔗 项目 {project_id} 关联代码 {:?}", req.code_ids);

    let user_id = caller.require()?;
    let cnt = state
        .service
        .connect_codes(project_id, user_id, req.code_ids)
        .await?;
    Ok(Json(Reply { data: cnt }))
}

/// 点赞/取消点赞项目，返回最新点赞数
#[utoipa::path(post, path = "/project/like/{project_id}", tag = "projects")]
pub async fn like_project<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    let user_id = caller.require()?;
    let cnt = state.service.like_project(project_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 收藏/取消收藏项目，返回最新收藏数
#[utoipa::path(post, path = "/project/favorite/{project_id}", tag = "projects")]
pub async fn favorite_project<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<i64>>, AppError> {
    let user_id = caller.require()?;
    let cnt = state.service.favorite_project(project_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 查询项目版本是否为打开状态，1为打开
#[utoipa::path(get, path = "/project/open/{project_id}", tag = "projects")]
pub async fn is_project_open<S: BackendService>(
    State(state): State<AppState<S>>,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    let open = state.service.is_project_open(project_id).await?;
    Ok(Json(Reply { data: open }))
}

/// 探测项目URL可达性
#[utoipa::path(post,
    path = "/project/check",
    tag = "projects",
    request_body = UrlCheckReq,
    responses(
        (status = 200, description = "是否可达", body = Reply<bool>)
    ),
)]
pub async fn check_project_url<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<UrlCheckReq>,
) -> Result<Json<Reply<bool>>, AppError> {
    debug!("🌐 探测URL {}", req.url);

    req.validate()?;
    let user_id = caller.require()?;
    let reachable = state.service.check_project_url(&req.url, user_id).await?;
    Ok(Json(Reply { data: reachable }))
}

/// 搜索项目标签
#[utoipa::path(get,
    path = "/project/tag",
    tag = "projects",
    params(TagSearch),
    responses(
        (status = 200, description = "标签列表", body = Reply<Vec<TagRes>>)
    ),
)]
pub async fn find_project_tags<S: BackendService>(
    State(state): State<AppState<S>>,
    Query(search): Query<TagSearch>,
) -> Result<Json<Reply<Vec<TagRes>>>, AppError> {
    let keyword = search.keyword.unwrap_or_default();
    let tags = state.service.search_project_tags(&keyword).await?;
    Ok(Json(Reply { data: tags }))
}

/// 写项目反馈
///
/// 匿名也可以写，匿名反馈之后无法修改或删除。返回项目最新的反馈总数。
#[utoipa::path(post,
    path = "/project/feedback",
    tag = "projects",
    request_body = FeedbackReq,
    responses(
        (status = 200, description = "项目当前反馈总数", body = Reply<i32>)
    ),
)]
pub async fn create_feedback<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<FeedbackReq>,
) -> Result<Json<Reply<i32>>, AppError> {
    debug!("💬 写反馈 {:#?}", req);

    req.validate()?;
    let cnt = state.service.insert_feedback(req, caller.0).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 修改反馈
///
/// 只有作者本人能改，已被采纳的反馈返回409。
#[utoipa::path(put,
    path = "/project/feedback",
    tag = "projects",
    request_body = FeedbackUpdateReq,
)]
pub async fn update_feedback<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Json(req): Json<FeedbackUpdateReq>,
) -> Result<Json<Reply<i64>>, AppError> {
    debug!("🔄 修改反馈 {:#?}", req);

    req.validate()?;
    let user_id = caller.require()?;
    let feedback_id = req.feedback_id;
    state.service.update_feedback(req, user_id).await?;
    Ok(Json(Reply { data: feedback_id }))
}

/// 作者查看版本组收到的全部反馈
///
/// 按版本归类；非作者调用得到空列表。
#[utoipa::path(get,
    path = "/project/{project_id}/feedback",
    tag = "projects",
    responses(
        (status = 200, description = "反馈列表", body = Reply<Vec<FeedbackInfoRes>>)
    ),
)]
pub async fn find_feedbacks<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(project_id): Path<i64>,
) -> Result<Json<Reply<Vec<FeedbackInfoRes>>>, AppError> {
    debug!("🔍 查询项目反馈列表 {project_id}");

    let user_id = caller.require()?;
    let entries = state.service.get_feedback_list(project_id, user_id).await?;
    Ok(Json(Reply { data: entries }))
}

/// 删除反馈，返回项目最新的反馈总数
#[utoipa::path(delete, path = "/project/feedback/{feedback_id}", tag = "projects")]
pub async fn delete_feedback<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(feedback_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    debug!("🗑️ 删除反馈 {feedback_id}");

    let user_id = caller.require()?;
    let cnt = state.service.delete_feedback(feedback_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 点赞/取消点赞反馈，返回最新点赞数
#[utoipa::path(post, path = "/project/feedback/like/{feedback_id}", tag = "projects")]
pub async fn like_feedback<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(feedback_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    let user_id = caller.require()?;
    let cnt = state.service.like_feedback(feedback_id, user_id).await?;
    Ok(Json(Reply { data: cnt }))
}

/// 投诉反馈
///
/// 每个用户对同一条反馈只能投诉一次，重复投诉返回409。
#[utoipa::path(post, path = "/project/feedback/complain/{feedback_id}", tag = "projects")]
pub async fn complain_feedback<S: BackendService>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(feedback_id): Path<i64>,
) -> Result<Json<Reply<i32>>, AppError> {
    debug!("💬 投诉反馈 {feedback_id}");

    let user_id = caller.require()?;
    let cnt = state
        .service
        .complain_feedback(feedback_id, user_id)
        .await?;
    Ok(Json(Reply { data: cnt }))
}
