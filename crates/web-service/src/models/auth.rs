//! 调用者身份提取器
//!
//! 上游网关完成鉴权后把用户ID注入 `x-user-id` 头，后端只读取、不校验签名。
//! 没有这个头的请求视为匿名访问，匿名是否被允许由各接口自己决定。

use crate::models::err::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// 网关注入用户ID的头名称
pub const USER_ID_HEADER: &str = "x-user-id";

/// 请求的调用者，`None` 表示匿名
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Option<i64>);

impl Caller {
    /// 需要登录身份的接口使用，匿名请求按用户不存在处理
    pub fn require(self) -> Result<i64, AppError> {
        self.0
            .ok_or_else(|| AppError::NotFound("用户不存在".to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Caller(None));
        };
        let user_id = value
            .to_str()
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| AppError::BadRequest("x-user-id 头不是合法的用户ID".to_string()))?;
        Ok(Caller(Some(user_id)))
    }
}
