//! 接口层数据模型
//!
//! 请求/响应DTO、统一错误类型和调用者身份提取器。

pub mod auth;
pub mod codes;
pub mod common;
pub mod err;
pub mod projects;
