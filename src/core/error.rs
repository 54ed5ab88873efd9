//! 核心错误处理模块

use serde::{Deserialize, Serialize};

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            msg: msg.into(),
        }
    }
}

/// 核心错误类型
///
/// 校验错误在边界处处理，不会到达存储层；存储错误的细节只写日志，不返回给客户端。
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("product already exists")]
    Duplicate,
    #[error("request body rejected: {0}")]
    BadRequest(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("request timed out")]
    Timeout,
}

/// 错误响应结构
///
/// `status` 与 HTTP 状态码一致；`errors`（全部校验错误）和 `field`（首个校验错误）按策略二选一。
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}
