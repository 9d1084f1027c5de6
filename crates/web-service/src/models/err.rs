use crate::services::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use color_eyre::eyre::Error;
use database::DatabaseError;
use thiserror::Error;
use validator::ValidationErrors;

/// 使用 [`thiserror`] 定义错误类型
/// 方便根据类型转换为相应的http错误码
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据验证错误，这种错误通常都是用户参数不正确导致的，转换为400
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),

    /// 请求语义不合法：空的关联列表、未知排序键、跨版本组的采纳等
    #[error("参数错误: {0}")]
    BadRequest(String),

    /// 目标资源不存在
    #[error("资源不存在: {0}")]
    NotFound(String),

    /// 调用者不是资源作者
    #[error("没有操作权限: {0}")]
    Forbidden(String),

    /// 操作目标不是版本组的最新版本
    #[error("不是最新版本: {0}")]
    NotNewestVersion(String),

    /// 状态冲突：修改已被采纳的反馈、重复投诉等
    #[error("操作冲突: {0}")]
    Conflict(String),

    /// 仓库层数据库错误
    #[error(transparent)]
    RepositoryError(#[from] DatabaseError),

    /// 缩略图存储错误
    #[error(transparent)]
    StorageError(#[from] StorageError),

    /// 其他类型错误
    #[error(transparent)]
    InternalError(#[from] Error),
}

/// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ValidationFailed(err) => (StatusCode::BAD_REQUEST, format!("Validate failed: {err}")).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            AppError::NotNewestVersion(msg) => (StatusCode::CONFLICT, msg).into_response(),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            AppError::RepositoryError(err) => match err {
                DatabaseError::SqlxError(sqlx::Error::RowNotFound) => {
                    (StatusCode::NOT_FOUND, format!("Record not found: {err}")).into_response()
                }
                DatabaseError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Resource not found: {msg}")).into_response(),
                DatabaseError::Conflict(msg) => (StatusCode::CONFLICT, format!("Conflict: {msg}")).into_response(),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, format!("Repository error: {err}")).into_response(),
            },
            AppError::StorageError(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {err}")).into_response(),
            AppError::InternalError(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Something went wrong: {err}")).into_response(),
        }
    }
}
